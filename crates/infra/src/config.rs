//! Configuration loading and representation.
//!
//! Values come from the process environment:
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `FORMGATE_SIGNING_SECRET` | yes | – |
//! | `FORMGATE_SIGNATURE_SKEW_SECS` | no | `300` |
//! | `FORMGATE_BIND_ADDR` | no | `0.0.0.0:8080` |
//! | `DATABASE_URL` | no | in-memory identity store |

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use formgate_auth::VerifierConfig;
use formgate_auth::signature::DEFAULT_SKEW_SECS;

pub const ENV_SIGNING_SECRET: &str = "FORMGATE_SIGNING_SECRET";
pub const ENV_SKEW_SECS: &str = "FORMGATE_SIGNATURE_SKEW_SECS";
pub const ENV_BIND_ADDR: &str = "FORMGATE_BIND_ADDR";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set to a non-empty value")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub verifier: VerifierConfig,
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests, alternative sources).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENV_SIGNING_SECRET)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(ENV_SIGNING_SECRET))?;

        let skew_secs = match lookup(ENV_SKEW_SECS) {
            None => DEFAULT_SKEW_SECS,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs >= 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: ENV_SKEW_SECS,
                    reason: format!("expected non-negative whole seconds, got '{raw}'"),
                })?,
        };

        let bind_raw = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            name: ENV_BIND_ADDR,
            reason: e.to_string(),
        })?;

        let database_url = lookup(ENV_DATABASE_URL).filter(|s| !s.is_empty());

        Ok(Self {
            verifier: VerifierConfig::new(secret, Duration::seconds(skew_secs)),
            bind_addr,
            database_url,
        })
    }
}
