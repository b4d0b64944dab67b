use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Career, CursoWithCareer};
use crate::database::{catalog, enrollments, users};
use crate::error::ApiError;
use crate::handlers::validation::non_blank;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

const DEFAULT_CURSO_STATUS: &str = "active";

/// GET /career/all
pub async fn careers_all(State(state): State<AppState>) -> ApiResult<Vec<Career>> {
    let mut conn = state.pool.acquire().await?;
    Ok(ApiResponse::success(catalog::list_careers(&mut conn).await?))
}

#[derive(Debug, Deserialize)]
pub struct CareerRequest {
    pub name: String,
}

/// POST /career/add - career names are unique
pub async fn career_add(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CareerRequest>,
) -> ApiResult<Career> {
    let name = non_blank(Some(payload.name.as_str())).ok_or_else(|| ApiError::invalid_field("name", "name is required"))?;

    let mut conn = state.pool.acquire().await?;
    let career = catalog::create_career(&mut conn, name).await?;
    tracing::info!(career_id = career.id, "career created");
    Ok(ApiResponse::created(career))
}

/// DELETE /career/:id - its cursos stay, without a career
pub async fn career_delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Value> {
    let mut conn = state.pool.acquire().await?;
    catalog::delete_career(&mut conn, id).await?;
    Ok(ApiResponse::success(json!({
        "status": "success",
        "message": format!("Career {} deleted", id),
    })))
}

/// GET /cursos/all
pub async fn cursos_all(State(state): State<AppState>) -> ApiResult<Vec<CursoWithCareer>> {
    let mut conn = state.pool.acquire().await?;
    Ok(ApiResponse::success(catalog::list_cursos(&mut conn).await?))
}

#[derive(Debug, Deserialize)]
pub struct CursoRequest {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub career_name: Option<String>,
}

/// POST /curso/AddCurso - the named career is reused or created in the same transaction
pub async fn curso_add(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CursoRequest>,
) -> ApiResult<CursoWithCareer> {
    let name = non_blank(Some(payload.name.as_str())).ok_or_else(|| ApiError::invalid_field("name", "name is required"))?;
    let status = non_blank(payload.status.as_deref()).unwrap_or(DEFAULT_CURSO_STATUS);

    let mut tx = state.pool.begin().await?;
    let career = match non_blank(payload.career_name.as_deref()) {
        Some(career_name) => Some(catalog::find_or_create_career(&mut tx, career_name).await?),
        None => None,
    };
    let curso = catalog::create_curso(&mut tx, name, status, career.as_ref().map(|c| c.id)).await?;
    tx.commit().await?;

    tracing::info!(curso_id = curso.id, "curso created");
    Ok(ApiResponse::created(CursoWithCareer {
        id: curso.id,
        name: curso.name,
        status: curso.status,
        career_id: curso.career_id,
        career: career.map(|c| c.name),
    }))
}

/// DELETE /curso/delete/:id - refused while payments reference the curso
pub async fn curso_delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Value> {
    let mut conn = state.pool.acquire().await?;
    catalog::delete_curso(&mut conn, id).await?;
    Ok(ApiResponse::success(json!({
        "status": "success",
        "message": format!("Curso {} deleted", id),
    })))
}

/// GET /user/cursos/:username - enrollments of any user, by username
pub async fn cursos_by_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<Value> {
    let mut conn = state.pool.acquire().await?;
    let user = users::find_profile_by_username(&mut conn, &username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", username)))?;
    let cursos = enrollments::cursos_for_user(&mut conn, user.user_id).await?;

    Ok(ApiResponse::success(json!({
        "user_id": user.user_id,
        "username": user.username,
        "cursos": cursos,
    })))
}
