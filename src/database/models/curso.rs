use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Curso {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub career_id: Option<i64>,
}

/// Curso joined with the name of its career, if it has one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CursoWithCareer {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub career_id: Option<i64>,
    pub career: Option<String>,
}
