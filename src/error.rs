//! Error types for budget-backoffice
//!
//! Two tiers: infrastructure failures (database, io, config) that surface to
//! clients as a generic message, and request/business failures whose message
//! is shown verbatim.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackofficeError {
    /// A row referenced by id does not exist. Carries the caller-facing message.
    #[error("{0}")]
    NotFound(String),

    /// Field-level validation failure.
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid ID : {0}")]
    InvalidId(String),

    #[error("invalid data request: {0}")]
    InvalidBody(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Known path, unsupported verb
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackofficeError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) | Self::InvalidId(_) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database(_) | Self::Io(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to put in the response envelope.
    ///
    /// Infrastructure details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::InvalidInput(msg) | Self::Unauthorized(msg) => msg.clone(),
            Self::InvalidId(_) => "invalid ID".to_string(),
            Self::InvalidBody(_) => "invalid data request".to_string(),
            Self::MethodNotAllowed => "Method Not Allowed".to_string(),
            Self::Database(_) => "database error".to_string(),
            Self::Io(_) | Self::Config(_) | Self::Internal(_) => "internal error".to_string(),
        }
    }

    /// True for failures of the storage layer rather than of the request
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Io(_) | Self::Config(_) | Self::Internal(_)
        )
    }
}

impl From<serde_json::Error> for BackofficeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidBody(err.to_string())
    }
}

/// Result type alias for backoffice operations
pub type Result<T> = std::result::Result<T, BackofficeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_generic_to_clients() {
        let err = BackofficeError::Database(rusqlite::Error::InvalidQuery);
        assert_eq!(err.public_message(), "database error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_infrastructure());
    }

    #[test]
    fn referential_errors_keep_their_message() {
        let err = BackofficeError::NotFound("data budget post not found".into());
        assert_eq!(err.public_message(), "data budget post not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!err.is_infrastructure());
    }

    #[test]
    fn bad_body_hides_decoder_detail() {
        let err: BackofficeError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.public_message(), "invalid data request");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
