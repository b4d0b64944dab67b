use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub curso_id: i64,
}

/// A curso as seen from one enrolled student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrolledCurso {
    #[serde(skip)]
    pub enrollment_id: i64,
    pub id: i64,
    pub name: String,
    pub status: String,
    pub career: Option<String>,
}
