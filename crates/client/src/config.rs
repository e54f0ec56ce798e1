use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a
/// backend on `localhost:8080`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_base_url: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long a cached query is served without refetching (default: `30`).
    pub cache_stale_secs: u64,
    /// Where the session document is persisted.
    pub session_file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/v1".into(),
            request_timeout_secs: 30,
            cache_stale_secs: 30,
            session_file: PathBuf::from(".barbearia/session.json"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `API_BASE_URL`         | `http://localhost:8080/api/v1`   |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                             |
    /// | `CACHE_STALE_SECS`     | `30`                             |
    /// | `SESSION_FILE`         | `.barbearia/session.json`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_base_url);

        let request_timeout_secs = parse_secs(
            "REQUEST_TIMEOUT_SECS",
            lookup("REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout_secs,
        )?;
        let cache_stale_secs = parse_secs(
            "CACHE_STALE_SECS",
            lookup("CACHE_STALE_SECS"),
            defaults.cache_stale_secs,
        )?;

        let session_file = lookup("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        Ok(Self {
            api_base_url,
            request_timeout_secs,
            cache_stale_secs,
            session_file,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_stale_time(&self) -> Duration {
        Duration::from_secs(self.cache_stale_secs)
    }
}

fn parse_secs(var: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected: "a whole number of seconds",
            value: raw,
        }),
    }
}
