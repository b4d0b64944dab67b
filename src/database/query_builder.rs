use std::marker::PhantomData;
use std::time::Instant;

use sqlx::{postgres::PgArguments, postgres::PgRow, FromRow, PgConnection, Postgres};

use crate::database::manager::DatabaseError;
use crate::filter::{SqlParam, SqlResult};

/// Executes generated SQL on a caller-scoped connection and maps rows to `T`.
pub struct QueryBuilder<T> {
    sql: SqlResult,
    _phantom: PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(sql: SqlResult) -> Self {
        Self { sql, _phantom: PhantomData }
    }

    pub async fn fetch_all(self, conn: &mut PgConnection) -> Result<Vec<T>, DatabaseError> {
        let SqlResult { query, params } = self.sql;
        tracing::debug!(%query, params = params.len(), "paged query");

        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(&query);
        for p in params {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(&mut *conn).await?;

        let elapsed_ms = started.elapsed().as_millis();
        if elapsed_ms > u128::from(crate::config::config().database.slow_query_threshold_ms) {
            tracing::warn!(%query, elapsed_ms, "slow query");
        }
        Ok(rows)
    }
}

fn bind_param<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    p: SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match p {
        SqlParam::Int(i) => q.bind(i),
        SqlParam::Text(s) => q.bind(s),
        SqlParam::Timestamp(t) => q.bind(t),
    }
}
