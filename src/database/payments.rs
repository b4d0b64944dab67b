use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::database::models::{Payment, PaymentListRow};
use crate::database::query_builder::QueryBuilder;
use crate::filter::payments::{PAYMENT_LIST_FROM, PAYMENT_LIST_SELECT};
use crate::filter::{Filter, Page, PageRequest, PaymentFilter, SqlParam};

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: i64,
    pub curso_id: i64,
    pub amount: i64,
    pub affect_month: NaiveDate,
}

pub async fn create(conn: &mut PgConnection, payment: &NewPayment) -> Result<Payment, DatabaseError> {
    let created = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments (user_id, curso_id, amount, affect_month) VALUES ($1, $2, $3, $4) \
         RETURNING id, user_id, curso_id, amount, affect_month, created_at",
    )
    .bind(payment.user_id)
    .bind(payment.curso_id)
    .bind(payment.amount)
    .bind(payment.affect_month)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match DatabaseError::from_write(e) {
        // payments carry no unique keys; a conflict here is a dangling reference
        DatabaseError::Conflict(_) => DatabaseError::not_found("User or curso not found"),
        other => other,
    })?;
    Ok(created)
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(format!("Payment {} not found", id)));
    }
    Ok(())
}

pub async fn list_page(
    conn: &mut PgConnection,
    filter: &PaymentFilter,
    page: PageRequest,
) -> Result<Page<PaymentListRow>, DatabaseError> {
    let sql = filter.to_sql(page)?;
    let rows = QueryBuilder::<PaymentListRow>::new(sql).fetch_all(conn).await?;
    Ok(Page::from_rows(rows, page))
}

/// Every payment of one user, unpaged, in id order.
pub async fn list_for_user(conn: &mut PgConnection, user_id: i64) -> Result<Vec<PaymentListRow>, DatabaseError> {
    let mut filter = Filter::new(PAYMENT_LIST_SELECT, PAYMENT_LIST_FROM, "p.id")?;
    filter.where_clause().eq("p.user_id", SqlParam::Int(user_id))?;
    let rows = QueryBuilder::<PaymentListRow>::new(filter.to_sql()?).fetch_all(conn).await?;
    Ok(rows)
}
