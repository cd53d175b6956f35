//! Value objects: compared by value, validated on construction.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A normalised e-mail address (trimmed, lower-cased).
///
/// Only the shape is checked: one `@` with a non-empty local part and a
/// dotted domain. Deliverability is the mail server's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let normalized = raw.trim().to_lowercase();
        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(DomainError::validation("email must contain '@'"));
        };
        if local.is_empty() || domain.contains('@') {
            return Err(DomainError::validation("email has an invalid local part"));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(DomainError::validation("email has an invalid domain"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = EmailAddress::parse("  Priya.S@College.EDU ").unwrap();
        assert_eq!(email.as_str(), "priya.s@college.edu");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for raw in ["", "no-at-sign", "@college.edu", "a@b@c.edu", "a@localhost", "a@.edu", "a@college."] {
            assert!(EmailAddress::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
