//! `token-svc`: temporary media token service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise telemetry (JSON logs, optional OTLP spans).
//! 3. Load the parent token into [`ParentTokenStore`].
//! 4. Spawn the parent token refresh task (file sources only).
//! 5. Build the Axum router and start the HTTP server.

mod config;
mod credential;
mod server;
mod telemetry;

use anyhow::Result;
use tracing::info;

use config::Config;
use credential::ParentTokenStore;
use server::state::{AppState, TtlPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        default_ttl_secs = cfg.default_ttl_secs,
        max_ttl_secs = cfg.max_ttl_secs,
        "token-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. Parent token
    // -----------------------------------------------------------------------
    let parent_tokens = ParentTokenStore::new();
    credential::load(&cfg, &parent_tokens).await?;

    // -----------------------------------------------------------------------
    // 4. Background tasks
    // -----------------------------------------------------------------------
    let _parent_token_refresh = credential::refresh_task(cfg.clone(), parent_tokens.clone());

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(parent_tokens, TtlPolicy::from(&cfg));
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
