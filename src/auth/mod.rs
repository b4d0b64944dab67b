use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

pub mod password;

pub use password::{hash_password, verify_password, PasswordError};

/// Token payload. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, username: impl Into<String>) -> Result<Self, JwtError> {
        Self::issued_at(user_id, username, Utc::now(), config::config().security.jwt_expiry_hours)
    }

    /// Fails when `expiry_hours` does not fit a timestamp after `now`.
    pub fn issued_at(
        user_id: i64,
        username: impl Into<String>,
        now: DateTime<Utc>,
        expiry_hours: u64,
    ) -> Result<Self, JwtError> {
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: user_id,
            username: username.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Issues a signed token for the user with the configured secret and lifetime.
pub fn generate_token(user_id: i64, username: &str) -> Result<String, JwtError> {
    encode_claims(&Claims::new(user_id, username)?, &config::config().security.jwt_secret)
}

pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }
    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), claims, &key)?)
}

/// Checks signature and expiry.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(data.claims)
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, JwtError> {
    let value = headers.get(AUTHORIZATION).ok_or(JwtError::MissingHeader)?;
    let value = value.to_str().map_err(|_| JwtError::MalformedHeader)?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(JwtError::MalformedHeader),
    }
}

/// Extracts and validates the bearer token of a request.
pub fn verify_token(headers: &HeaderMap) -> Result<Claims, JwtError> {
    let token = bearer_token(headers)?;
    decode_token(token, &config::config().security.jwt_secret)
}
