//! Configuration loading and validation for the token service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use temp_token::ParentToken;

/// Validated token service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Parent API token, inline. Exactly one of this and `parent_token_file`
    /// is **required**.
    #[serde(default)]
    pub parent_token: Option<String>,

    /// Path to a file holding the parent API token (e.g. a mounted secret).
    #[serde(default)]
    pub parent_token_file: Option<PathBuf>,

    /// How often (seconds) to re-read `parent_token_file`.
    #[serde(default = "default_parent_token_refresh_interval")]
    pub parent_token_refresh_interval_secs: u64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Token lifetime used when a request does not name one.
    #[serde(default = "default_ttl")]
    pub default_ttl_secs: u64,

    /// Longest lifetime a request may ask for.
    #[serde(default = "default_max_ttl")]
    pub max_ttl_secs: u64,

    /// OTLP endpoint for span export. Logs only when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the parent token comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ParentTokenSource {
    Inline(String),
    File(PathBuf),
}

impl fmt::Debug for ParentTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentTokenSource::Inline(_) => f.write_str("Inline([REDACTED])"),
            ParentTokenSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

fn default_parent_token_refresh_interval() -> u64 {
    3600
}
fn default_listen_port() -> u16 {
    8080
}
fn default_ttl() -> u64 {
    600
}
fn default_max_ttl() -> u64 {
    86_400
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The configured parent token source.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly one of `PARENT_TOKEN` and
    /// `PARENT_TOKEN_FILE` is set.
    pub fn parent_token_source(&self) -> Result<ParentTokenSource> {
        match (&self.parent_token, &self.parent_token_file) {
            (Some(token), None) => Ok(ParentTokenSource::Inline(token.clone())),
            (None, Some(path)) => Ok(ParentTokenSource::File(path.clone())),
            (Some(_), Some(_)) => {
                anyhow::bail!("set only one of PARENT_TOKEN and PARENT_TOKEN_FILE")
            }
            (None, None) => anyhow::bail!("PARENT_TOKEN or PARENT_TOKEN_FILE is required"),
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        match self.parent_token_source()? {
            ParentTokenSource::Inline(token) => {
                ParentToken::parse(&token).context("PARENT_TOKEN is invalid")?;
            }
            ParentTokenSource::File(path) => {
                if path.as_os_str().is_empty() {
                    anyhow::bail!("PARENT_TOKEN_FILE must not be empty");
                }
            }
        }

        if self.parent_token_refresh_interval_secs == 0 {
            anyhow::bail!("PARENT_TOKEN_REFRESH_INTERVAL_SECS must be > 0");
        }
        if self.default_ttl_secs == 0 {
            anyhow::bail!("DEFAULT_TTL_SECS must be > 0");
        }
        if self.default_ttl_secs > self.max_ttl_secs {
            anyhow::bail!("DEFAULT_TTL_SECS must not exceed MAX_TTL_SECS");
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("parent_token", &self.parent_token.as_ref().map(|_| "[REDACTED]"))
            .field("parent_token_file", &self.parent_token_file)
            .field(
                "parent_token_refresh_interval_secs",
                &self.parent_token_refresh_interval_secs,
            )
            .field("listen_port", &self.listen_port)
            .field("default_ttl_secs", &self.default_ttl_secs)
            .field("max_ttl_secs", &self.max_ttl_secs)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}
