//! Session tokens
//!
//! HS512-signed JWTs carrying the user's numeric id and login name. Default
//! lifetime is 24 hours.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{BackofficeError, Result};

pub const DEFAULT_EXPIRY_SECONDS: u64 = 24 * 60 * 60;

/// Payload stored in the token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: i64,
    pub userid: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Token issuer and verifier
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl JwtValidator {
    /// Returns an error if the secret is empty or shorter than 32 characters
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self> {
        if secret.is_empty() {
            return Err(BackofficeError::Config(
                "JWT_SECRET is required unless DEV_MODE is set".into(),
            ));
        }

        if secret.len() < 32 {
            return Err(BackofficeError::Config(
                "JWT_SECRET must be at least 32 characters".into(),
            ));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Validator with a fixed secret for local development
    pub fn new_dev() -> Self {
        Self {
            secret: "dev-mode-secret-not-for-production-use-123456".into(),
            expiry_seconds: DEFAULT_EXPIRY_SECONDS,
        }
    }

    pub fn generate_token(&self, user_id: i64, userid: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| BackofficeError::Internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            user_id,
            userid: userid.to_string(),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| BackofficeError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verify signature and expiry. Every failure is reported as "Invalid token".
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS512);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| {
            tracing::debug!(error = %err, "Token rejected");
            BackofficeError::Unauthorized("Invalid token".into())
        })
    }
}

/// Extract token from Authorization header.
/// Supports "Bearer <token>" format and raw tokens.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    if !header.contains(' ') {
        let token = header.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}
