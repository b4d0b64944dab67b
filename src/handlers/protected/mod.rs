// Protected handlers: every route here sits behind jwt_auth_middleware and can
// read the caller from `Extension<AuthUser>`.
pub mod enrollment;
pub mod users;
