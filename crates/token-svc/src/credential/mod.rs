//! Parent token loading, caching, and background refresh.
//!
//! # Lifecycle
//!
//! 1. At startup, [`load`] reads the parent token from `PARENT_TOKEN` or
//!    `PARENT_TOKEN_FILE`, validates it, and seeds the [`ParentTokenStore`].
//! 2. For file sources, [`refresh_task`] re-reads the file on an interval so
//!    a rotated secret is picked up without a restart.
//!
//! # Security invariants
//!
//! - The parent token is never logged. Only the account id may appear in
//!   log fields.

pub mod store;

pub use store::{CredentialError, ParentTokenStore};

use std::path::Path;

use anyhow::{Context, Result};
use tokio::time;
use tracing::{info, warn};

use crate::config::{Config, ParentTokenSource};

/// Read the configured parent token source and store it in `store`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the token is malformed.
pub async fn load(cfg: &Config, store: &ParentTokenStore) -> Result<()> {
    let raw = match cfg.parent_token_source()? {
        ParentTokenSource::Inline(token) => token,
        ParentTokenSource::File(path) => read_token_file(&path).await?,
    };
    let changed = store
        .store(&raw)
        .await
        .context("failed to store parent token")?;

    if changed {
        let account_id = store.current().await?.account_id().to_owned();
        info!(account_id = %account_id, "parent token loaded");
    }
    Ok(())
}

async fn read_token_file(path: &Path) -> Result<String> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read parent token file {}", path.display()))?;
    Ok(contents.trim().to_owned())
}

/// Spawn a background task that periodically re-reads a file-based parent
/// token. Returns `None` for inline sources, which never change.
///
/// On failure the previous token is retained and a warning is emitted.
pub fn refresh_task(cfg: Config, store: ParentTokenStore) -> Option<tokio::task::JoinHandle<()>> {
    if !matches!(cfg.parent_token_source(), Ok(ParentTokenSource::File(_))) {
        return None;
    }
    let interval = std::time::Duration::from_secs(cfg.parent_token_refresh_interval_secs);
    Some(tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; startup already loaded the token.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = load(&cfg, &store).await {
                warn!(error = %e, "parent token refresh failed; retaining previous token");
            }
        }
    }))
}
