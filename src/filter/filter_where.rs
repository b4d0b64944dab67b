use super::error::FilterError;
use super::types::{contains_pattern, SqlParam};

/// Accumulates AND-ed predicates and their positional parameters.
#[derive(Debug, Default)]
pub struct FilterWhere {
    conditions: Vec<String>,
    param_values: Vec<SqlParam>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn eq(&mut self, column: &str, value: SqlParam) -> Result<&mut Self, FilterError> {
        self.compare(column, "=", value)
    }

    pub fn gt(&mut self, column: &str, value: SqlParam) -> Result<&mut Self, FilterError> {
        self.compare(column, ">", value)
    }

    pub fn gte(&mut self, column: &str, value: SqlParam) -> Result<&mut Self, FilterError> {
        self.compare(column, ">=", value)
    }

    pub fn lt(&mut self, column: &str, value: SqlParam) -> Result<&mut Self, FilterError> {
        self.compare(column, "<", value)
    }

    /// Case-insensitive substring match of `needle` against any of `columns`.
    pub fn ilike_any(&mut self, columns: &[&str], needle: &str) -> Result<&mut Self, FilterError> {
        if columns.is_empty() {
            return Err(FilterError::InvalidColumn("ilike_any requires at least one column".to_string()));
        }
        for column in columns {
            Self::validate_column(column)?;
        }
        let placeholder = self.param(SqlParam::Text(contains_pattern(needle)));
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("{} ILIKE {}", c, placeholder))
            .collect();
        self.conditions.push(format!("({})", parts.join(" OR ")));
        Ok(self)
    }

    /// Substring match against the text form of a non-text column (e.g. a numeric id).
    pub fn text_contains(&mut self, column: &str, needle: &str) -> Result<&mut Self, FilterError> {
        Self::validate_column(column)?;
        let placeholder = self.param(SqlParam::Text(contains_pattern(needle)));
        self.conditions.push(format!("CAST({} AS TEXT) LIKE {}", column, placeholder));
        Ok(self)
    }

    /// Consumes the builder. An empty string means "no predicate".
    pub fn generate(self) -> (String, Vec<SqlParam>) {
        (self.conditions.join(" AND "), self.param_values)
    }

    pub(crate) fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        format!("${}", self.param_values.len())
    }

    fn compare(&mut self, column: &str, op: &str, value: SqlParam) -> Result<&mut Self, FilterError> {
        Self::validate_column(column)?;
        let placeholder = self.param(value);
        self.conditions.push(format!("{} {} {}", column, op, placeholder));
        Ok(self)
    }

    /// Accepts `column` or `alias.column`, each part `[a-z_][a-z0-9_]*`.
    pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
        let valid_part = |part: &str| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) if first.is_ascii_lowercase() || first == '_' => {
                    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
                }
                _ => false,
            }
        };
        let parts: Vec<&str> = column.split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
            return Err(FilterError::InvalidColumn(column.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_are_joined_with_and_and_numbered_in_order() {
        let mut w = FilterWhere::new();
        w.eq("p.user_id", SqlParam::Int(3)).unwrap();
        w.gte("p.created_at", SqlParam::Text("x".into())).unwrap();
        let (sql, params) = w.generate();
        assert_eq!(sql, "p.user_id = $1 AND p.created_at >= $2");
        assert_eq!(params, vec![SqlParam::Int(3), SqlParam::Text("x".into())]);
    }

    #[test]
    fn ilike_any_reuses_one_placeholder_across_columns() {
        let mut w = FilterWhere::new();
        w.ilike_any(&["d.first_name", "u.email"], "ana").unwrap();
        let (sql, params) = w.generate();
        assert_eq!(sql, "(d.first_name ILIKE $1 OR u.email ILIKE $1)");
        assert_eq!(params, vec![SqlParam::Text("%ana%".into())]);
    }

    #[test]
    fn text_contains_casts_the_column() {
        let mut w = FilterWhere::new();
        w.text_contains("d.dni", "123").unwrap();
        assert_eq!(w.generate().0, "CAST(d.dni AS TEXT) LIKE $1");
    }

    #[test]
    fn rejects_suspicious_column_names() {
        let mut w = FilterWhere::new();
        assert!(w.eq("id; DROP TABLE users", SqlParam::Int(1)).is_err());
        assert!(w.eq("a.b.c", SqlParam::Int(1)).is_err());
        assert!(w.eq("Users.id", SqlParam::Int(1)).is_err());
        assert!(w.eq("", SqlParam::Int(1)).is_err());
        assert!(w.ilike_any(&[], "x").is_err());
        assert!(w.is_empty());
    }

    #[test]
    fn empty_builder_generates_no_predicate() {
        let (sql, params) = FilterWhere::new().generate();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }
}
