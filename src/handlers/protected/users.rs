use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth;
use crate::database::models::{User, UserListRow, UserProfile};
use crate::database::users::{self, DetailFields};
use crate::error::ApiError;
use crate::filter::{Page, PageParams, PageRequest, UserFilter};
use crate::handlers::validation::{self, int_or_string, non_blank, Validator};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<UserListRow>,
    pub next_cursor: Option<i64>,
}

impl From<Page<UserListRow>> for UserPage {
    fn from(page: Page<UserListRow>) -> Self {
        Self { users: page.items, next_cursor: page.next_cursor }
    }
}

/// GET /users/all?limit&last_seen_id
pub async fn all(State(state): State<AppState>, ApiQuery(params): ApiQuery<PageParams>) -> ApiResult<UserPage> {
    let page = PageRequest::try_from(params)?;

    let mut conn = state.pool.acquire().await?;
    let users = users::list_page(&mut conn, &UserFilter::default(), page).await?;
    Ok(ApiResponse::success(users.into()))
}

#[derive(Debug, Deserialize)]
pub struct FilteredUsersRequest {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(flatten)]
    pub filter: UserFilter,
}

/// POST /users/paginated/filtered-async - search, dni and curso filters, ANDed
pub async fn filtered(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<FilteredUsersRequest>,
) -> ApiResult<UserPage> {
    let page = PageRequest::try_from(payload.page)?;

    let mut conn = state.pool.acquire().await?;
    let users = users::list_page(&mut conn, &payload.filter, page).await?;
    Ok(ApiResponse::success(users.into()))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /users/change-password - for the caller's own account
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Value> {
    let mut v = Validator::new();
    v.check(
        "new_password",
        validation::is_valid_password(&payload.new_password),
        format!("new_password must be at least {} characters", validation::MIN_PASSWORD_LEN),
    );
    v.finish()?;

    let mut conn = state.pool.acquire().await?;
    let user = users::find_by_id(&mut conn, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", caller.id)))?;

    if !auth::verify_password(&payload.current_password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "password change with wrong current password");
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let password_hash = auth::hash_password(&payload.new_password)?;
    users::update_password(&mut conn, user.id, &password_hash).await?;

    tracing::info!(user_id = user.id, "password changed");
    Ok(ApiResponse::success(json!({
        "status": "success",
        "message": "Password updated successfully",
    })))
}

/// GET /users/:id
pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<User> {
    let mut conn = state.pool.acquire().await?;
    let user = users::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
    Ok(ApiResponse::success(user))
}

/// GET /users/profile/:id - account plus personal details, if any
pub async fn profile(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<UserProfile> {
    let mut conn = state.pool.acquire().await?;
    let profile = users::find_profile(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
    Ok(ApiResponse::success(profile))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "int_or_string")]
    pub dni: Option<i64>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl UpdateProfileRequest {
    fn validate(&self) -> Result<DetailFields, ApiError> {
        let firstname = non_blank(self.firstname.as_deref());
        let lastname = non_blank(self.lastname.as_deref());

        let mut v = Validator::new();
        if let Some(email) = non_blank(self.email.as_deref()) {
            v.check("email", validation::is_valid_email(email), "email is not a valid address");
        }
        v.check("dni", self.dni.map_or(false, |dni| dni > 0), "dni is required and must be positive")
            .check("firstname", firstname.is_some(), "firstname is required")
            .check("lastname", lastname.is_some(), "lastname is required");
        v.finish()?;

        Ok(DetailFields {
            dni: self.dni.unwrap_or_default(),
            first_name: firstname.unwrap_or_default().to_string(),
            last_name: lastname.unwrap_or_default().to_string(),
            kind: non_blank(self.kind.as_deref()).unwrap_or("student").to_string(),
        })
    }
}

/// PUT /users/profile/:id - email and detail row change together or not at all.
/// A missing or blank `email` keeps the stored address.
pub async fn update_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<UserProfile> {
    let detail = payload.validate()?;

    let mut tx = state.pool.begin().await?;
    if users::find_by_id(&mut tx, id).await?.is_none() {
        return Err(ApiError::not_found(format!("User {} not found", id)));
    }
    if let Some(email) = non_blank(payload.email.as_deref()) {
        users::update_email(&mut tx, id, email).await?;
    }
    users::upsert_detail(&mut tx, id, &detail).await?;
    let profile = users::find_profile(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
    tx.commit().await?;

    tracing::info!(user_id = id, "profile updated");
    Ok(ApiResponse::success(profile))
}

/// DELETE /users/:id - details, enrollments and payments are removed with the user
pub async fn remove(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Value> {
    let mut conn = state.pool.acquire().await?;
    users::delete(&mut conn, id).await?;

    tracing::info!(user_id = id, "user deleted");
    Ok(ApiResponse::success(json!({
        "status": "success",
        "message": format!("User {} deleted", id),
    })))
}
