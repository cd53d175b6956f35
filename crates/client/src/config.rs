//! Client configuration (environment-driven).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::store::{FileSessionStore, MemorySessionStore, SessionStore};

pub const DEFAULT_API_URL: &str = "http://localhost:4000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PLACEMATE_REQUEST_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` mount point.
    pub api_url: String,
    /// Upper bound for every identity request; a timed-out check resolves anonymous.
    pub request_timeout: Duration,
    /// Explicit location for the role hint; `None` uses the app data directory.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            session_file: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Read `PLACEMATE_API_URL`, `PLACEMATE_REQUEST_TIMEOUT_SECS` and `PLACEMATE_SESSION_FILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("PLACEMATE_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }

        if let Some(raw) = lookup("PLACEMATE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.session_file = lookup("PLACEMATE_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Role-hint store for this configuration.
    ///
    /// Falls back to an in-memory store when no data directory exists
    /// (e.g. a sandboxed CI user without `$HOME`).
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        if let Some(path) = &self.session_file {
            return Arc::new(FileSessionStore::at(path.clone()));
        }
        match FileSessionStore::default_location() {
            Some(store) => Arc::new(store),
            None => {
                tracing::warn!("no app data directory; role hint will not survive restarts");
                Arc::new(MemorySessionStore::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.session_file.is_none());
    }

    #[test]
    fn env_overrides_are_honoured() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PLACEMATE_API_URL", "https://placements.example.edu/api"),
            ("PLACEMATE_REQUEST_TIMEOUT_SECS", "3"),
            ("PLACEMATE_SESSION_FILE", "/tmp/pm-session.json"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://placements.example.edu/api");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/pm-session.json")));
    }

    #[test]
    fn zero_or_garbage_timeout_is_rejected() {
        for raw in ["0", "ten", "-1"] {
            let err = ClientConfig::from_lookup(lookup(&[("PLACEMATE_REQUEST_TIMEOUT_SECS", raw)]))
                .unwrap_err();
            assert_eq!(err, ConfigError::InvalidTimeout(raw.to_string()));
        }
    }

    #[test]
    fn explicit_session_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hint.json");
        let config = ClientConfig {
            session_file: Some(path.clone()),
            ..ClientConfig::default()
        };

        config.session_store().remember_role(placemate_auth::Role::Admin);
        assert!(path.exists());
    }
}
