//! Access/refresh token issuing and verification (HS256).

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use placemate_auth::{Principal, TokenClaims, TokenKind, TokenValidationError, validate_claims};
use placemate_core::PrincipalId;

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encoding(String),

    /// Bad signature, malformed token, or wrong secret.
    #[error("invalid token: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    /// Well-formed refresh token that is no longer the one on record.
    #[error("refresh token revoked")]
    Revoked,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues token pairs and keeps the single live refresh token per principal.
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_tokens: Mutex<HashMap<PrincipalId, String>>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            access: SigningKeys::from_secret(&config.access_secret),
            refresh: SigningKeys::from_secret(&config.refresh_secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            refresh_tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Mint a new pair; the refresh token replaces any earlier one for `principal`.
    pub fn issue_pair(&self, principal: &Principal, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let access = self.mint(principal, TokenKind::Access, now)?;
        let refresh = self.mint(principal, TokenKind::Refresh, now)?;
        self.refresh_tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(principal.id, refresh.clone());
        Ok(TokenPair { access, refresh })
    }

    pub fn verify_access(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = decode(token, &self.access.decoding)?;
        validate_claims(&claims, TokenKind::Access, now)?;
        Ok(claims)
    }

    /// Verify a refresh token and check it is the one on record.
    pub fn verify_refresh(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = decode(token, &self.refresh.decoding)?;
        validate_claims(&claims, TokenKind::Refresh, now)?;
        let stored = self.refresh_tokens.lock().unwrap_or_else(PoisonError::into_inner);
        match stored.get(&claims.sub) {
            Some(current) if current == token => Ok(claims),
            _ => Err(TokenError::Revoked),
        }
    }

    /// Forget the live refresh token of whoever owns `token`, if it is still live.
    /// Returns whether anything was revoked.
    pub fn revoke(&self, token: &str) -> bool {
        let Ok(claims) = decode(token, &self.refresh.decoding) else {
            return false;
        };
        let mut stored = self.refresh_tokens.lock().unwrap_or_else(PoisonError::into_inner);
        if stored.get(&claims.sub).is_some_and(|current| current == token) {
            stored.remove(&claims.sub);
            true
        } else {
            false
        }
    }

    fn mint(&self, principal: &Principal, kind: TokenKind, now: DateTime<Utc>) -> Result<String, TokenError> {
        let (keys, ttl) = match kind {
            TokenKind::Access => (&self.access, self.access_ttl),
            TokenKind::Refresh => (&self.refresh, self.refresh_ttl),
        };
        let iat = now.timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX / 2);
        let claims = TokenClaims {
            sub: principal.id,
            email: principal.email.clone(),
            role: principal.role,
            kind,
            iat,
            exp: iat.saturating_add(ttl),
            jti: Some(uuid::Uuid::now_v7().to_string()),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

/// Signature check only; time and kind checks are `validate_claims`'s job.
fn decode(token: &str, key: &DecodingKey) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    jsonwebtoken::decode::<TokenClaims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| TokenError::Invalid(e.to_string()))
}
