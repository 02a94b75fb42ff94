//! Shared application state injected into every Axum handler.

use std::fmt;
use std::sync::Arc;

use rand_core::{CryptoRngCore, OsRng};

use crate::config::Config;
use crate::credential::ParentTokenStore;

/// Lifetime bounds for issued tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Applied when a request does not name a TTL.
    pub default_secs: u64,
    /// Upper bound on a requested TTL.
    pub max_secs: u64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            default_secs: 600,
            max_secs: 86_400,
        }
    }
}

impl From<&Config> for TtlPolicy {
    fn from(cfg: &Config) -> Self {
        Self {
            default_secs: cfg.default_ttl_secs,
            max_secs: cfg.max_ttl_secs,
        }
    }
}

/// Hands each request its own CSPRNG for salt and IV draws.
///
/// Production uses [`OsRng`], a stateless handle, so requests never share
/// generator state or contend on a lock.
#[derive(Clone)]
pub struct RngSource(Arc<dyn Fn() -> Box<dyn CryptoRngCore + Send> + Send + Sync>);

impl RngSource {
    /// Build a source from a per-request constructor.
    pub fn new<F>(make: F) -> Self
    where
        F: Fn() -> Box<dyn CryptoRngCore + Send> + Send + Sync + 'static,
    {
        Self(Arc::new(make))
    }

    /// A fresh generator for one request.
    pub fn rng(&self) -> Box<dyn CryptoRngCore + Send> {
        (self.0)()
    }
}

impl Default for RngSource {
    fn default() -> Self {
        Self::new(|| -> Box<dyn CryptoRngCore + Send> { Box::new(OsRng) })
    }
}

impl fmt::Debug for RngSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RngSource")
    }
}

/// Application state shared across all request handlers.
///
/// Cloning is cheap: the store and RNG source are `Arc`-backed and the
/// policy is `Copy`.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Holder for the current parent token.
    pub parent_tokens: ParentTokenStore,
    /// TTL defaults and limits.
    pub ttl: TtlPolicy,
    /// Randomness for token sealing.
    pub rng: RngSource,
}

impl AppState {
    /// Create a new [`AppState`] drawing randomness from the OS.
    pub fn new(parent_tokens: ParentTokenStore, ttl: TtlPolicy) -> Self {
        Self {
            parent_tokens,
            ttl,
            rng: RngSource::default(),
        }
    }

    /// Replace the randomness source.
    #[cfg(test)]
    pub fn with_rng(mut self, rng: RngSource) -> Self {
        self.rng = rng;
        self
    }
}
