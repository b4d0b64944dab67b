// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (bearer JWT, see middleware::jwt_auth_middleware)
pub mod public;
pub mod protected;
pub mod validation;
