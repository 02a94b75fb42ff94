//! Axum middleware settings applied to the router.

use std::time::Duration;

/// Per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest accepted request body. Token requests are a handful of short fields.
pub const REQUEST_BODY_LIMIT: usize = 4 * 1024;

/// `Cache-Control` value sent on every response; issued tokens are credentials.
pub const CACHE_CONTROL: &str = "no-store";
