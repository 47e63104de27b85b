//! Session token signing and verification.
//!
//! Tokens are JWTs signed with HS256 using the configured secret. Claims
//! carry the user's id, email and role plus standard iat/exp timestamps.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::db::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user id
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Sign a session token for an authenticated user.
pub fn sign(config: &AuthConfig, user: &User) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(config.token_ttl_hours);

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());

    encode(&header, &claims, &encoding_key).context("Failed to encode session token")
}

/// Verify a session token and return its claims.
pub fn verify(config: &AuthConfig, token: &str) -> Result<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(token, &decoding_key, &validation)
        .context("Failed to verify session token")?;

    Ok(data.claims)
}
