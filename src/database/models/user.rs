use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::filter::Paginated;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row of the paginated user listing; serialized as-is as the list view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserListRow {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub dni: i64,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub curso: Option<String>,
}

impl Paginated for UserListRow {
    fn cursor_id(&self) -> i64 {
        self.id
    }
}

/// A user with whatever personal details exist. Detail fields are null when no detail row exists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub dni: Option<i64>,
    #[serde(rename = "firstname")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname")]
    pub last_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl UserProfile {
    /// "First Last" when details exist, otherwise the username.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_row_uses_client_field_names() {
        let row = UserListRow {
            id: 4,
            username: "mlopez".into(),
            email: None,
            dni: 30111222,
            first_name: "María".into(),
            last_name: "López".into(),
            kind: "student".into(),
            curso: Some("Química I".into()),
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["firstname"], "María");
        assert_eq!(v["lastname"], "López");
        assert_eq!(v["type"], "student");
        assert!(v["email"].is_null());
        assert_eq!(row.cursor_id(), 4);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut profile = UserProfile {
            user_id: 1,
            username: "jdoe".into(),
            email: None,
            dni: None,
            first_name: None,
            last_name: None,
            kind: None,
        };
        assert_eq!(profile.display_name(), "jdoe");
        profile.first_name = Some("John".into());
        profile.last_name = Some("Doe".into());
        assert_eq!(profile.display_name(), "John Doe");
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "jdoe".into(),
            password_hash: "$argon2id$...".into(),
            email: Some("j@example.com".into()),
            created_at: Utc::now(),
        };
        let v = serde_json::to_value(&user).unwrap();
        assert!(v.get("password_hash").is_none());
    }
}
