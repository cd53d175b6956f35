//! Service configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_BIND: &str = "0.0.0.0:4000";
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const DEV_ACCESS_SECRET: &str = "placemate-dev-access-secret";
const DEV_REFRESH_SECRET: &str = "placemate-dev-refresh-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Mark cookies `Secure; SameSite=Strict` (production).
    pub cookie_secure: bool,
    /// Optional JSON seed for the user directory.
    pub users_file: Option<PathBuf>,
}

impl ApiConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 4000)),
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            cookie_secure: false,
            users_file: None,
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_raw = lookup("PLACEMATE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .parse()
            .with_context(|| format!("PLACEMATE_BIND is not a socket address: {bind_raw}"))?;

        let access_secret = secret(&lookup, "JWT_SECRET", DEV_ACCESS_SECRET);
        let refresh_secret = secret(&lookup, "JWT_REFRESH_SECRET", DEV_REFRESH_SECRET);

        let access_ttl = lookup("JWT_EXPIRES_IN")
            .map(|raw| parse_ttl(&raw))
            .unwrap_or(DEFAULT_ACCESS_TTL);

        let cookie_secure = lookup("PLACEMATE_COOKIE_SECURE")
            .map(|raw| matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            bind,
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            cookie_secure,
            users_file: lookup("PLACEMATE_USERS_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn secret(lookup: &impl Fn(&str) -> Option<String>, key: &str, dev_default: &str) -> String {
    match lookup(key).filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => {
            tracing::warn!(key, "secret not set; using insecure dev default");
            dev_default.to_string()
        }
    }
}

/// Parse `"<n>{s|m|h|d}"`; a bare number is seconds. Anything else is 15 minutes.
pub fn parse_ttl(raw: &str) -> Duration {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], Some(c.to_ascii_lowercase())),
        _ => (raw, None),
    };

    let Ok(n) = digits.parse::<u64>() else {
        return DEFAULT_ACCESS_TTL;
    };

    let seconds = match unit {
        None | Some('s') => Some(n),
        Some('m') => n.checked_mul(60),
        Some('h') => n.checked_mul(60 * 60),
        Some('d') => n.checked_mul(24 * 60 * 60),
        Some(_) => None,
    };

    seconds.map(Duration::from_secs).unwrap_or(DEFAULT_ACCESS_TTL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn ttl_grammar() {
        assert_eq!(parse_ttl("30s"), Duration::from_secs(30));
        assert_eq!(parse_ttl("15m"), Duration::from_secs(900));
        assert_eq!(parse_ttl("2h"), Duration::from_secs(7200));
        assert_eq!(parse_ttl("30d"), Duration::from_secs(30 * 86400));
        assert_eq!(parse_ttl("45"), Duration::from_secs(45));
        assert_eq!(parse_ttl(" 1M "), Duration::from_secs(60));
    }

    #[test]
    fn unparseable_ttl_falls_back_to_fifteen_minutes() {
        for raw in ["", "m", "10w", "ten minutes", "-5s", "1.5h"] {
            assert_eq!(parse_ttl(raw), DEFAULT_ACCESS_TTL, "{raw:?}");
        }
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind.port(), 4000);
        assert_eq!(config.access_ttl, DEFAULT_ACCESS_TTL);
        assert_eq!(config.refresh_ttl, DEFAULT_REFRESH_TTL);
        assert!(!config.cookie_secure);
        assert!(config.users_file.is_none());
        assert_ne!(config.access_secret, config.refresh_secret);
    }

    #[test]
    fn reads_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PLACEMATE_BIND", "127.0.0.1:8088"),
            ("JWT_SECRET", "a"),
            ("JWT_REFRESH_SECRET", "b"),
            ("JWT_EXPIRES_IN", "5m"),
            ("PLACEMATE_COOKIE_SECURE", "true"),
            ("PLACEMATE_USERS_FILE", "/etc/placemate/users.json"),
        ]))
        .unwrap();

        assert_eq!(config.bind.to_string(), "127.0.0.1:8088");
        assert_eq!(config.access_secret, "a");
        assert_eq!(config.refresh_secret, "b");
        assert_eq!(config.access_ttl, Duration::from_secs(300));
        assert!(config.cookie_secure);
        assert_eq!(config.users_file, Some(PathBuf::from("/etc/placemate/users.json")));
    }

    #[test]
    fn bad_bind_address_is_an_error() {
        let err = ApiConfig::from_lookup(lookup(&[("PLACEMATE_BIND", "localhost")])).unwrap_err();
        assert!(err.to_string().contains("PLACEMATE_BIND"));
    }
}
