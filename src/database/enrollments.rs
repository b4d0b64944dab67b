use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::database::models::{EnrolledCurso, Enrollment};

/// First write wins: a second enrollment of the same pair is a conflict.
pub async fn enroll(conn: &mut PgConnection, user_id: i64, curso_id: i64) -> Result<Enrollment, DatabaseError> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        "INSERT INTO enrollments (user_id, curso_id) VALUES ($1, $2) RETURNING id, user_id, curso_id",
    )
    .bind(user_id)
    .bind(curso_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(DatabaseError::from_write)?;
    Ok(enrollment)
}

pub async fn is_enrolled(conn: &mut PgConnection, user_id: i64, curso_id: i64) -> Result<bool, DatabaseError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM enrollments WHERE user_id = $1 AND curso_id = $2)",
    )
    .bind(user_id)
    .bind(curso_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists)
}

/// Cursos the user is enrolled in, oldest enrollment first.
pub async fn cursos_for_user(conn: &mut PgConnection, user_id: i64) -> Result<Vec<EnrolledCurso>, DatabaseError> {
    let cursos = sqlx::query_as::<_, EnrolledCurso>(
        "SELECT e.id AS enrollment_id, c.id, c.name, c.status, ca.name AS career \
         FROM enrollments e \
         JOIN cursos c ON c.id = e.curso_id \
         LEFT JOIN careers ca ON ca.id = c.career_id \
         WHERE e.user_id = $1 \
         ORDER BY e.id ASC",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(cursos)
}
