use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::filter::FilterError;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(#[from] FilterError),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn not_found(message: impl Into<String>) -> Self {
        DatabaseError::NotFound(message.into())
    }

    /// Constraint violations raised by a write become conflicts; the store settles races.
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() || db.is_foreign_key_violation() {
                return DatabaseError::Conflict(conflict_message(db.constraint()).to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "Username already exists",
        Some("users_email_key") => "Email already exists",
        Some("user_details_dni_key") => "DNI already exists",
        Some("user_details_user_id_key") => "User already has personal details",
        Some("careers_name_key") => "Career already exists",
        Some("enrollments_user_curso_key") => "User is already enrolled in this curso",
        Some("payments_curso_id_fkey") => "Curso has payments and cannot be removed",
        Some("payments_user_id_fkey") | Some("enrollments_user_id_fkey") => "User does not exist",
        Some("enrollments_curso_id_fkey") => "Curso does not exist",
        _ => "Record conflicts with existing data",
    }
}

/// Builds the connection pool. Handlers acquire from it per request; nothing holds a shared session.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let pool = Self::pool_options(config).connect(url).await?;
        info!("Connected to database at {}", Self::redacted_url(url)?);
        Ok(pool)
    }

    /// Pool that defers connecting until the first acquire.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Ok(Self::pool_options(config).connect_lazy(url)?)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Connection string with the password stripped, for logs.
    pub fn redacted_url(database_url: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
