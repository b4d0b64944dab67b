use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::database::models::{Career, Curso, CursoWithCareer};

pub async fn list_careers(conn: &mut PgConnection) -> Result<Vec<Career>, DatabaseError> {
    let careers = sqlx::query_as::<_, Career>("SELECT id, name FROM careers ORDER BY id ASC")
        .fetch_all(&mut *conn)
        .await?;
    Ok(careers)
}

pub async fn create_career(conn: &mut PgConnection, name: &str) -> Result<Career, DatabaseError> {
    let career = sqlx::query_as::<_, Career>("INSERT INTO careers (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map_err(DatabaseError::from_write)?;
    Ok(career)
}

/// Returns the career with this name, creating it if needed. Concurrent callers converge on one row.
pub async fn find_or_create_career(conn: &mut PgConnection, name: &str) -> Result<Career, DatabaseError> {
    let career = sqlx::query_as::<_, Career>(
        "INSERT INTO careers (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, name",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(career)
}

pub async fn delete_career(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM careers WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(format!("Career {} not found", id)));
    }
    Ok(())
}

pub async fn list_cursos(conn: &mut PgConnection) -> Result<Vec<CursoWithCareer>, DatabaseError> {
    let cursos = sqlx::query_as::<_, CursoWithCareer>(
        "SELECT c.id, c.name, c.status, c.career_id, ca.name AS career \
         FROM cursos c LEFT JOIN careers ca ON ca.id = c.career_id \
         ORDER BY c.id ASC",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(cursos)
}

pub async fn find_curso(conn: &mut PgConnection, id: i64) -> Result<Option<Curso>, DatabaseError> {
    let curso = sqlx::query_as::<_, Curso>("SELECT id, name, status, career_id FROM cursos WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(curso)
}

pub async fn create_curso(
    conn: &mut PgConnection,
    name: &str,
    status: &str,
    career_id: Option<i64>,
) -> Result<Curso, DatabaseError> {
    let curso = sqlx::query_as::<_, Curso>(
        "INSERT INTO cursos (name, status, career_id) VALUES ($1, $2, $3) \
         RETURNING id, name, status, career_id",
    )
    .bind(name)
    .bind(status)
    .bind(career_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(DatabaseError::from_write)?;
    Ok(curso)
}

/// Fails with a conflict while payments still reference the curso.
pub async fn delete_curso(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
    let result = sqlx::query("DELETE FROM cursos WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_write)?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found(format!("Curso {} not found", id)));
    }
    Ok(())
}
