//! [`ParentTokenStore`]: thread-safe holder for the validated parent token.

use std::sync::Arc;
use temp_token::{ParentToken, TokenError};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors produced by the credential layer.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No parent token has been loaded yet.
    #[error("parent token not yet loaded")]
    NotInitialised,

    /// The supplied parent token is malformed.
    #[error("invalid parent token: {0}")]
    Invalid(#[from] TokenError),
}

/// Thread-safe store for the current parent token.
///
/// Request handlers take short read locks; the refresh task takes the write
/// lock only to swap in a token that has already been validated.
#[derive(Clone, Debug, Default)]
pub struct ParentTokenStore {
    inner: Arc<RwLock<Option<ParentToken>>>,
}

impl ParentTokenStore {
    /// Create a new, empty [`ParentTokenStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a parent token is currently loaded.
    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Validate `raw` and store (or replace) the current parent token.
    ///
    /// Returns `true` if the stored token changed.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Invalid`] and keeps the previous token if
    /// `raw` does not parse.
    pub async fn store(&self, raw: &str) -> Result<bool, CredentialError> {
        let parsed = ParentToken::parse(raw)?;
        let mut lock = self.inner.write().await;
        let changed = lock
            .as_ref()
            .map_or(true, |current| current.expose_secret() != parsed.expose_secret());
        *lock = Some(parsed);
        Ok(changed)
    }

    /// Clone the current parent token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotInitialised`] if nothing has been stored.
    pub async fn current(&self) -> Result<ParentToken, CredentialError> {
        let lock = self.inner.read().await;
        lock.as_ref().cloned().ok_or(CredentialError::NotInitialised)
    }
}
