//! Login service

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, Claims, JwtValidator};
use crate::db::{users, Database};
use crate::error::{BackofficeError, Result};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub userid: String,
    pub password: String,
}

pub struct AuthService {
    db: Arc<Database>,
    jwt: JwtValidator,
}

impl AuthService {
    pub fn new(db: Arc<Database>, jwt: JwtValidator) -> Self {
        Self { db, jwt }
    }

    /// Check credentials and issue a token. Unknown user and wrong password
    /// are indistinguishable to the caller.
    pub fn login(&self, request: &LoginRequest) -> Result<String> {
        let user = self
            .db
            .with_conn(|conn| users::find_by_userid(conn, &request.userid))?;

        let user = match user {
            Some(user) if verify_password(&request.password, &user.password)? => user,
            _ => {
                warn!(userid = %request.userid, "Login rejected");
                return Err(BackofficeError::Unauthorized("user not found".into()));
            }
        };

        info!(userid = %user.userid, "Login");
        self.jwt.generate_token(user.id, &user.userid)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.jwt.verify_token(token)
    }

    /// Create or reset a login
    pub fn add_user(&self, userid: &str, password: &str) -> Result<i64> {
        if userid.trim().is_empty() || password.is_empty() {
            return Err(BackofficeError::InvalidInput("userid and password must be filled".into()));
        }
        let hash = hash_password(password)?;
        self.db.with_conn(|conn| users::upsert_user(conn, userid, &hash))
    }
}
