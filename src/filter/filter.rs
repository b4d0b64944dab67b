use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::types::{PageRequest, SqlParam, SqlResult};

/// Cursor-paginated SELECT over a fixed projection.
///
/// Rows are always ordered by `id_column` ascending; the cursor is an
/// exclusive lower bound on that column, so pages never overlap.
pub struct Filter {
    select_clause: &'static str,
    from_clause: &'static str,
    id_column: &'static str,
    where_data: FilterWhere,
    page: Option<PageRequest>,
}

impl Filter {
    pub fn new(
        select_clause: &'static str,
        from_clause: &'static str,
        id_column: &'static str,
    ) -> Result<Self, FilterError> {
        FilterWhere::validate_column(id_column)?;
        Ok(Self {
            select_clause,
            from_clause,
            id_column,
            where_data: FilterWhere::new(),
            page: None,
        })
    }

    pub fn where_clause(&mut self) -> &mut FilterWhere {
        &mut self.where_data
    }

    pub fn page(&mut self, page: PageRequest) -> &mut Self {
        self.page = Some(page);
        self
    }

    pub fn to_sql(self) -> Result<SqlResult, FilterError> {
        let Filter { select_clause, from_clause, id_column, mut where_data, page } = self;

        if let Some(last_seen_id) = page.and_then(|p| p.last_seen_id()) {
            where_data.gt(id_column, SqlParam::Int(last_seen_id))?;
        }
        let limit_clause = match page {
            Some(p) => format!("LIMIT {}", where_data.param(SqlParam::Int(p.limit()))),
            None => String::new(),
        };
        let (where_clause, params) = where_data.generate();

        let query = [
            format!("SELECT {}", select_clause),
            format!("FROM {}", from_clause),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            format!("ORDER BY {} ASC", id_column),
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }
}
