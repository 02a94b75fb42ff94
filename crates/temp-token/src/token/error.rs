//! Errors produced while minting or opening temporary tokens.

use thiserror::Error;

use crate::crypto::CipherError;

/// Temporary token error.
///
/// Cipher failures (including [`CipherError::RandomnessUnavailable`]) pass
/// through unchanged via [`TokenError::Cipher`].
#[derive(Debug, Error)]
pub enum TokenError {
    /// The parent token is empty or not of the form `<accountId>i<suffix>`.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The temporary token's cleartext prefix does not belong to this parent.
    #[error("temporary token was not issued from this parent token")]
    PrefixMismatch,

    /// The decrypted payload is not `<expire>[!<tag><value>]*` in tag order.
    #[error("malformed token payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

impl TokenError {
    /// Returns `true` for failures the caller caused with bad input, as
    /// opposed to environment or backend failures.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TokenError::InvalidArgument(_)
                | TokenError::PrefixMismatch
                | TokenError::MalformedPayload(_)
                | TokenError::Cipher(CipherError::Decryption | CipherError::InvalidFormat)
        )
    }
}
