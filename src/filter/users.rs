use serde::{Deserialize, Deserializer};

use super::error::FilterError;
use super::filter::Filter;
use super::types::{non_blank, PageRequest, SqlResult};

pub(crate) const USER_LIST_SELECT: &str =
    "u.id, u.username, u.email, d.dni, d.first_name, d.last_name, d.kind, fc.name AS curso";

// Inner join on user_details: users without a detail row are filtered by the store and never
// take a slot in the page. The lateral join picks the earliest enrollment as the "first" curso.
pub(crate) const USER_LIST_FROM: &str = "users u \
    JOIN user_details d ON d.user_id = u.id \
    LEFT JOIN LATERAL (\
        SELECT c.name FROM enrollments e JOIN cursos c ON c.id = e.curso_id \
        WHERE e.user_id = u.id ORDER BY e.id ASC LIMIT 1\
    ) fc ON TRUE";

const SEARCH_COLUMNS: [&str; 4] = ["d.first_name", "d.last_name", "u.username", "u.email"];

/// Optional user-list filters; every supplied filter is ANDed with the others.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub dni: Option<String>,
    #[serde(default)]
    pub curso: Option<String>,
}

impl UserFilter {
    pub fn to_sql(&self, page: PageRequest) -> Result<SqlResult, FilterError> {
        let mut filter = Filter::new(USER_LIST_SELECT, USER_LIST_FROM, "u.id")?;
        let conditions = filter.where_clause();

        if let Some(search) = non_blank(self.search.as_deref()) {
            conditions.ilike_any(&SEARCH_COLUMNS, search)?;
        }
        if let Some(dni) = non_blank(self.dni.as_deref()) {
            conditions.text_contains("d.dni", dni)?;
        }
        if let Some(curso) = non_blank(self.curso.as_deref()) {
            conditions.ilike_any(&["fc.name"], curso)?;
        }

        filter.page(page);
        filter.to_sql()
    }
}

// Clients send the DNI either as a string or as a bare number.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(i64),
    }

    Ok(Option::<TextOrNumber>::deserialize(deserializer)?.map(|v| match v {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    }))
}
