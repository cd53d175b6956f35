//! Session cookies: `pm_access_token` and `pm_refresh_token`.

use std::time::Duration;

use axum::http::{HeaderMap, header};

pub const ACCESS_COOKIE: &str = "pm_access_token";
pub const REFRESH_COOKIE: &str = "pm_refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Attributes shared by both session cookies.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl CookiePolicy {
    /// `Lax` in development; `Secure` plus `Strict` when `secure` is set.
    pub fn new(secure: bool) -> Self {
        Self {
            path: "/".to_string(),
            secure,
            http_only: true,
            same_site: if secure { SameSite::Strict } else { SameSite::Lax },
        }
    }

    /// `Set-Cookie` value storing `value` for `max_age`.
    pub fn build_set_cookie(&self, name: &str, value: &str, max_age: Duration) -> String {
        let mut parts = vec![
            format!("{name}={value}"),
            format!("Path={}", self.path),
            format!("Max-Age={}", max_age.as_secs()),
        ];
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.push(format!("SameSite={}", self.same_site.as_str()));
        parts.join("; ")
    }

    /// `Set-Cookie` value that removes the cookie.
    pub fn build_delete_cookie(&self, name: &str) -> String {
        let mut cookie = format!("{name}=; Path={}; Max-Age=0", self.path);
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        cookie
    }
}

/// Value of cookie `name` from the request's `Cookie` headers, if non-empty.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| pair.trim().strip_prefix(prefix.as_str()).map(str::to_string))
        .filter(|value| !value.is_empty())
}
