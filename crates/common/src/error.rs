//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::TokenFailure`] → 500
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed, e.g. a TTL outside the allowed range.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Token minting failed in the crypto layer (randomness, cipher).
    #[error("token failure: {0}")]
    TokenFailure(String),

    /// The parent token is not yet loaded or is temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::TokenFailure(_) => 500,
            ServiceError::Unavailable(_) => 503,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::TokenFailure(_) => "token_failure",
            ServiceError::Unavailable(_) => "service_unavailable",
        }
    }
}
