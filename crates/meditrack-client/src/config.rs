//! Client configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use meditrack_core::TimestampFormat;
use thiserror::Error;

/// Backend used when `MEDITRACK_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://meditrack-backend-one.vercel.app";

pub const ENV_API_URL: &str = "MEDITRACK_API_URL";
pub const ENV_SESSION_DB: &str = "MEDITRACK_SESSION_DB";
pub const ENV_REQUEST_TIMEOUT: &str = "MEDITRACK_REQUEST_TIMEOUT_SECS";
pub const ENV_UTC_TIMESTAMPS: &str = "MEDITRACK_UTC_TIMESTAMPS";

/// Configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash
    pub api_url: String,
    /// SQLite file holding the session identity
    pub session_db: PathBuf,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Rendering (and searching) of creation timestamps
    pub timestamps: TimestampFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_db: default_session_db(),
            request_timeout: None,
            timestamps: TimestampFormat::local(),
        }
    }
}

impl ClientConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: ENV_API_URL,
                    value: url,
                });
            }
            config.api_url = url;
        }

        if let Some(path) = get(ENV_SESSION_DB) {
            config.session_db = PathBuf::from(path);
        }

        if let Some(secs) = get(ENV_REQUEST_TIMEOUT) {
            let secs = secs
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout {
                    var: ENV_REQUEST_TIMEOUT,
                    value: secs.clone(),
                })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        if let Some(flag) = get(ENV_UTC_TIMESTAMPS) {
            if matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes") {
                config.timestamps = TimestampFormat::utc();
            }
        }

        Ok(config)
    }

    /// Override the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

fn default_session_db() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("meditrack").join("session.db"))
        .unwrap_or_else(|| PathBuf::from("meditrack-session.db"))
}
