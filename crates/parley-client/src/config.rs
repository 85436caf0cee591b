//! Client configuration loaded from environment variables.

use parley_shared::constants::{DEFAULT_FETCH_SIZE, MESSAGE_GROUP_TIMESPAN_MS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the chat backend.
    /// Env: `PARLEY_SERVER_URL`
    /// Default: `http://127.0.0.1:8080`
    pub server_url: String,

    /// Page size for history fetches and search.
    /// Env: `PARLEY_FETCH_SIZE`
    pub fetch_size: usize,

    /// Grouping window for consecutive messages of one sender (ms).
    /// Env: `PARLEY_GROUP_TIMESPAN_MS`
    pub group_timespan_ms: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            fetch_size: DEFAULT_FETCH_SIZE,
            group_timespan_ms: MESSAGE_GROUP_TIMESPAN_MS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("PARLEY_SERVER_URL") {
            if !url.is_empty() {
                config.server_url = url;
            }
        }

        if let Some(val) = lookup("PARLEY_FETCH_SIZE") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.fetch_size = n,
                _ => tracing::warn!(value = %val, "Invalid PARLEY_FETCH_SIZE, using default"),
            }
        }

        if let Some(val) = lookup("PARLEY_GROUP_TIMESPAN_MS") {
            match val.parse::<i64>() {
                Ok(ms) if ms >= 0 => config.group_timespan_ms = ms,
                _ => tracing::warn!(value = %val, "Invalid PARLEY_GROUP_TIMESPAN_MS, using default"),
            }
        }

        config
    }
}
