//! Shared handler state.

use sqlx::PgPool;

/// Cloned into every handler. Connections are acquired per request from the pool;
/// nothing here holds a session open.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
