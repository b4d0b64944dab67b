use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::database::models::EnrolledCurso;
use crate::database::{catalog, enrollments, users};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddCursoRequest {
    pub id_user: i64,
    pub id_curso: i64,
}

/// POST /user/addcurso - enroll a student; each (user, curso) pair at most once
pub async fn add_curso(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AddCursoRequest>,
) -> ApiResult<Value> {
    let mut tx = state.pool.begin().await?;

    let user = users::find_profile(&mut tx, payload.id_user)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", payload.id_user)))?;
    let curso = catalog::find_curso(&mut tx, payload.id_curso)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Curso {} not found", payload.id_curso)))?;

    if enrollments::is_enrolled(&mut tx, user.user_id, curso.id).await? {
        return Err(ApiError::conflict("User is already enrolled in this curso"));
    }
    let enrollment = enrollments::enroll(&mut tx, user.user_id, curso.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.user_id, curso_id = curso.id, "enrolled");
    Ok(ApiResponse::created(json!({
        "status": "success",
        "message": format!("{} enrolled in {}", user.display_name(), curso.name),
        "enrollment": enrollment,
    })))
}

#[derive(Debug, Serialize)]
pub struct MiCursada {
    pub user_id: i64,
    pub cursos: Vec<EnrolledCurso>,
}

/// GET /user/mi-cursada - the caller's cursos
pub async fn mi_cursada(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<MiCursada> {
    let mut conn = state.pool.acquire().await?;
    let cursos = enrollments::cursos_for_user(&mut conn, caller.id).await?;
    if cursos.is_empty() {
        return Err(ApiError::not_found("No cursos found for this user"));
    }
    Ok(ApiResponse::success(MiCursada { user_id: caller.id, cursos }))
}
