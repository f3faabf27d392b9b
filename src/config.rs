//! TOML configuration for rasctl.
//!
//! Layered lookup: an explicit path, the `RASCTL_CONFIG` environment variable,
//! `$HOME/.rasctl/rasctl.toml`, then compiled-in defaults. Every section is
//! optional and falls back to its defaults field by field.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::retry::RetryConfig;

/// Environment variable naming a config file to load.
pub const CONFIG_ENV_VAR: &str = "RASCTL_CONFIG";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the rasctl process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RasctlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub cancel: CancelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RasctlConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded rasctl configuration");
        Ok(config)
    }

    /// Resolve configuration.
    ///
    /// The first of these that exists is loaded, and must load cleanly:
    /// 1. The `explicit` path.
    /// 2. The path in the `RASCTL_CONFIG` environment variable.
    /// 3. `$HOME/.rasctl/rasctl.toml`.
    ///
    /// With none of them present, compiled-in defaults are used.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(env_path) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(env_path);
            return Self::load(&path).with_context(|| {
                format!(
                    "{} names a config file that could not be loaded: {}",
                    CONFIG_ENV_VAR,
                    path.display()
                )
            });
        }

        if let Some(user_path) = user_config_path() {
            if user_path.exists() {
                return Self::load(&user_path);
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }
}

fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".rasctl").join("rasctl.toml"))
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Where the Result Archive Store lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the API server, without a trailing slash.
    pub api_server_url: String,
    /// Value sent in the `ClientApiVersion` header on every request.
    pub client_api_version: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_server_url: "http://localhost:8080".to_string(),
            client_api_version: "0.38.0".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

/// Rate-limit retry policy applied to every API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
    /// Randomise each delay between 50% and 150% of its nominal value.
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            base_delay_ms: defaults.base_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
            backoff_factor: defaults.backoff_factor,
            jitter: defaults.jitter,
        }
    }
}

impl RetrySettings {
    /// Convert to the client's retry policy. At least one attempt is made,
    /// and a factor that is not a finite number of at least 1.0 falls back
    /// to the default.
    pub fn to_retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        let backoff_factor = if self.backoff_factor.is_finite() && self.backoff_factor >= 1.0 {
            self.backoff_factor
        } else {
            warn!(
                backoff_factor = self.backoff_factor,
                fallback = defaults.backoff_factor,
                "ignoring invalid retry.backoff_factor"
            );
            defaults.backoff_factor
        };

        RetryConfig {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_factor,
            jitter: self.jitter,
        }
    }
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// Behaviour of `runs cancel --name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CancelConfig {
    pub on_ambiguous_run_name: AmbiguityPolicy,
}

/// What to do when a run name resolves to more than one active run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Refuse to cancel anything.
    #[default]
    Fail,
    /// Cancel the most recently queued match.
    Newest,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Diagnostic logging, written to stderr.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
