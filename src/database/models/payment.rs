use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::filter::Paginated;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub curso_id: i64,
    pub amount: i64,
    pub affect_month: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentListRow {
    pub id: i64,
    pub amount: i64,
    pub affect_month: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub curso_id: i64,
    pub curso: String,
}

impl Paginated for PaymentListRow {
    fn cursor_id(&self) -> i64 {
        self.id
    }
}

/// Payment as returned to clients, with the student's full name.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub id: i64,
    pub amount: i64,
    pub affect_month: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub alumno: String,
    pub curso_id: i64,
    pub curso: String,
}

impl From<PaymentListRow> for PaymentView {
    fn from(row: PaymentListRow) -> Self {
        Self {
            id: row.id,
            amount: row.amount,
            affect_month: row.affect_month,
            created_at: row.created_at,
            user_id: row.user_id,
            alumno: format!("{} {}", row.first_name, row.last_name),
            curso_id: row.curso_id,
            curso: row.curso,
        }
    }
}
