use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth;
use crate::database::models::UserProfile;
use crate::database::users::{self, DetailFields, NewUser};
use crate::error::ApiError;
use crate::handlers::validation::{self, int_or_string, non_blank, Validator};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

const DEFAULT_KIND: &str = "student";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
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

impl SignupRequest {
    /// Detail fields are all-or-nothing: sending any of them requires dni,
    /// firstname and lastname.
    fn detail(&self) -> Result<Option<DetailFields>, ApiError> {
        let firstname = non_blank(self.firstname.as_deref());
        let lastname = non_blank(self.lastname.as_deref());
        let kind = non_blank(self.kind.as_deref());

        match (self.dni, firstname, lastname) {
            (None, None, None) if kind.is_none() => Ok(None),
            (Some(dni), Some(first_name), Some(last_name)) => Ok(Some(DetailFields {
                dni,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                kind: kind.unwrap_or(DEFAULT_KIND).to_string(),
            })),
            (dni, first, last) => {
                let mut v = Validator::new();
                v.check("dni", dni.is_some(), "dni is required with personal details")
                    .check("firstname", first.is_some(), "firstname is required with personal details")
                    .check("lastname", last.is_some(), "lastname is required with personal details");
                v.finish().map(|()| None)
            }
        }
    }

    fn into_new_user(self, password_hash: String, detail: Option<DetailFields>) -> NewUser {
        NewUser {
            username: self.username.trim().to_string(),
            password_hash,
            email: non_blank(self.email.as_deref()).map(str::to_string),
            detail,
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.check(
            "username",
            validation::is_valid_username(self.username.trim()),
            "username must be 3-50 characters of letters, digits, '_', '.' or '-'",
        )
        .check(
            "password",
            validation::is_valid_password(&self.password),
            format!("password must be at least {} characters", validation::MIN_PASSWORD_LEN),
        );
        if let Some(email) = non_blank(self.email.as_deref()) {
            v.check("email", validation::is_valid_email(email), "email is not a valid address");
        }
        if let Some(dni) = self.dni {
            v.check("dni", dni > 0, "dni must be a positive number");
        }
        v.finish()
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: i64,
    pub username: String,
}

/// POST /users/signup - create an account, optionally with personal details
///
/// User and detail rows are written in one transaction; a duplicate username,
/// email or dni leaves no row behind.
pub async fn signup(State(state): State<AppState>, ApiJson(payload): ApiJson<SignupRequest>) -> ApiResult<Value> {
    payload.validate()?;
    let detail = payload.detail()?;
    let password_hash = auth::hash_password(&payload.password)?;
    let new_user = payload.into_new_user(password_hash, detail);

    let mut tx = state.pool.begin().await?;
    let user = users::create(&mut tx, &new_user).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "user signed up");
    Ok(ApiResponse::created(json!({
        "status": "success",
        "message": "User created successfully",
        "user": CreatedUser { id: user.id, username: user.username },
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub token: String,
    pub user: UserProfile,
    pub message: &'static str,
}

/// POST /users/loginUser - exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let invalid = || ApiError::unauthorized("Invalid username or password");

    let mut conn = state.pool.acquire().await?;
    let user = users::find_by_username(&mut conn, payload.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(username = %user.username, "failed login");
        return Err(invalid());
    }

    let profile = users::find_profile(&mut conn, user.id).await?.ok_or_else(invalid)?;
    let token = auth::generate_token(user.id, &user.username)?;

    Ok(ApiResponse::success(LoginResponse {
        status: "success",
        token,
        user: profile,
        message: "User logged in successfully",
    }))
}
