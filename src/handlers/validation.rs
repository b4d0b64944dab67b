//! Request field checks shared by the handlers.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::{ApiError, FieldErrors};

pub use crate::filter::non_blank;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=50;

/// Collects per-field failures and reports them together.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, ok: bool, reason: impl Into<String>) -> &mut Self {
        if !ok && !self.errors.contains_key(field) {
            self.errors.insert(field.to_string(), reason.into());
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid request data", Some(self.errors)))
        }
    }
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_LEN.contains(&username.chars().count())
        && username.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// `local@domain.tld` with no whitespace; deliverability is not checked.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}

/// Parses a `YYYY-MM-DD` query value; blank means absent.
pub fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::invalid_field(field, format!("{} must be a date in YYYY-MM-DD format", field))),
    }
}

/// Month a payment applies to: `YYYY-MM-DD` or `YYYY-MM` (first of the month).
pub fn parse_month(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d"))
        .map_err(|_| ApiError::invalid_field(field, format!("{} must be YYYY-MM or YYYY-MM-DD", field)))
}

/// Accepts a JSON number or a numeric string, as form clients send either.
pub fn int_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Text(String),
    }

    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(n)) => Ok(Some(n)),
        Some(IntOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(IntOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {:?}", s))),
    }
}
