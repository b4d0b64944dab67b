use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::FilterError;

/// Page size used when the caller does not send `limit`.
pub const DEFAULT_LIMIT: i64 = 20;
/// Largest page a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// Raw pagination input as it arrives in a query string or JSON body.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub last_seen_id: Option<i64>,
}

/// Validated pagination window: `0 < limit <= MAX_LIMIT`, optional exclusive lower id bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: i64,
    last_seen_id: Option<i64>,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, last_seen_id: Option<i64>) -> Result<Self, FilterError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit <= 0 {
            return Err(FilterError::InvalidLimit("limit must be greater than 0".to_string()));
        }
        if limit > MAX_LIMIT {
            return Err(FilterError::InvalidLimit(format!("limit must be less than or equal to {}", MAX_LIMIT)));
        }
        Ok(Self { limit, last_seen_id })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn last_seen_id(&self) -> Option<i64> {
        self.last_seen_id
    }
}

impl TryFrom<PageParams> for PageRequest {
    type Error = FilterError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        Self::new(params.limit, params.last_seen_id)
    }
}

/// Typed bind parameter for generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Blank strings count as "filter not supplied".
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Wraps `needle` for a substring LIKE/ILIKE match, escaping LIKE metacharacters.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
