use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::database::models::{User, UserListRow, UserProfile};
use crate::database::query_builder::QueryBuilder;
use crate::filter::{Page, PageRequest, UserFilter};

const PROFILE_SELECT: &str = "SELECT u.id AS user_id, u.username, u.email, d.dni, \
    d.first_name, d.last_name, d.kind \
    FROM users u LEFT JOIN user_details d ON d.user_id = u.id";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub detail: Option<DetailFields>,
}

#[derive(Debug, Clone)]
pub struct DetailFields {
    pub dni: i64,
    pub first_name: String,
    pub last_name: String,
    pub kind: String,
}

pub async fn find_by_username(conn: &mut PgConnection, username: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, email, created_at FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(user)
}

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, email, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(user)
}

pub async fn find_profile(conn: &mut PgConnection, id: i64) -> Result<Option<UserProfile>, DatabaseError> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!("{} WHERE u.id = $1", PROFILE_SELECT))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(profile)
}

pub async fn find_profile_by_username(
    conn: &mut PgConnection,
    username: &str,
) -> Result<Option<UserProfile>, DatabaseError> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!("{} WHERE u.username = $1", PROFILE_SELECT))
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(profile)
}

/// Inserts the user and, when given, its detail row. Run inside a transaction so both land or neither.
pub async fn create(conn: &mut PgConnection, new_user: &NewUser) -> Result<User, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash, email) VALUES ($1, $2, $3) \
         RETURNING id, username, password_hash, email, created_at",
    )
    .bind(&new_user.username)
    .bind(&new_user.password_hash)
    .bind(&new_user.email)
    .fetch_one(&mut *conn)
    .await
    .map_err(DatabaseError::from_write)?;

    if let Some(detail) = &new_user.detail {
        upsert_detail(conn, user.id, detail).await?;
    }

    Ok(user)
}

pub async fn update_password(conn: &mut PgConnection, id: i64, password_hash: &str) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(format!("User {} not found", id)));
    }
    Ok(())
}

pub async fn update_email(conn: &mut PgConnection, id: i64, email: &str) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE users SET email = $1 WHERE id = $2")
        .bind(email)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_write)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(format!("User {} not found", id)));
    }
    Ok(())
}

/// Creates the detail row or replaces its fields; a user has at most one.
pub async fn upsert_detail(conn: &mut PgConnection, user_id: i64, detail: &DetailFields) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO user_details (dni, first_name, last_name, kind, user_id) VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (user_id) DO UPDATE SET dni = EXCLUDED.dni, first_name = EXCLUDED.first_name, \
         last_name = EXCLUDED.last_name, kind = EXCLUDED.kind",
    )
    .bind(detail.dni)
    .bind(&detail.first_name)
    .bind(&detail.last_name)
    .bind(&detail.kind)
    .bind(user_id)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

/// Removes the user; details, enrollments and payments go with it.
pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(format!("User {} not found", id)));
    }
    Ok(())
}

pub async fn list_page(
    conn: &mut PgConnection,
    filter: &UserFilter,
    page: PageRequest,
) -> Result<Page<UserListRow>, DatabaseError> {
    let sql = filter.to_sql(page)?;
    let rows = QueryBuilder::<UserListRow>::new(sql).fetch_all(conn).await?;
    Ok(Page::from_rows(rows, page))
}
