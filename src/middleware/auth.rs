use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Authenticated user context extracted from the JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub issued_at: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            issued_at: claims.iat,
        }
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token; otherwise
/// injects [`AuthUser`] for the handler.
pub async fn jwt_auth_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let claims = auth::verify_token(request.headers()).map_err(|err| {
        tracing::warn!(path = %request.uri().path(), "rejected request: {}", err);
        ApiError::from(err)
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}
