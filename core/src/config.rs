//! Environment-driven client configuration.
//!
//! | Variable                | Default                 |
//! |-------------------------|-------------------------|
//! | `MOCKSERVER_URL`        | `http://localhost:1080` |
//! | `MOCKSERVER_TIMEOUT_MS` | unset (no timeout)      |

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:1080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer number of milliseconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    EmptyBaseUrl { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = match lookup("MOCKSERVER_URL") {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::EmptyBaseUrl {
                    name: "MOCKSERVER_URL",
                })
            }
            Some(url) => url.trim().to_string(),
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = match lookup("MOCKSERVER_TIMEOUT_MS") {
            Some(raw) => {
                // A zero timeout would fail every call before dialing.
                let millis = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|&millis| millis > 0)
                    .ok_or_else(|| ConfigError::InvalidTimeout {
                        name: "MOCKSERVER_TIMEOUT_MS",
                        value: raw.clone(),
                    })?;
                Some(Duration::from_millis(millis))
            }
            None => None,
        };

        Ok(Self { base_url, timeout })
    }
}
