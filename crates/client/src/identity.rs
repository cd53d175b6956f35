//! Identity endpoints: who am I, log in, log out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use placemate_auth::Principal;

use crate::config::ClientConfig;
use crate::error::SessionError;

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Sign-up form for `POST /auth/register`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Remote identity service.
///
/// Implementations own the session credentials (cookies); callers only see
/// principals and errors.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Current principal, `Ok(None)` when the server reports no user.
    async fn current_principal(&self) -> Result<Option<Principal>, SessionError>;

    async fn login(&self, credentials: &LoginRequest) -> Result<(), SessionError>;

    async fn register(&self, form: &RegisterRequest) -> Result<(), SessionError>;

    async fn logout(&self) -> Result<(), SessionError>;

    /// Trade the refresh credential for a fresh access credential.
    async fn refresh_tokens(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    user: Option<Principal>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Cookie-session client for the portal API.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpIdentityClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_me(&self) -> Result<Option<Principal>, SessionError> {
        let resp = self.http.get(self.url("/auth/me")).send().await?;
        let resp = ensure_success(resp).await.map_err(|err| match err {
            SessionError::Rejected { status: 401, .. } => SessionError::Unauthorized,
            other => other,
        })?;
        let body = resp.text().await?;
        let envelope: UserEnvelope =
            serde_json::from_str(&body).map_err(|e| SessionError::Malformed(e.to_string()))?;
        Ok(envelope.user)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<(), SessionError> {
        let mut req = self.http.post(self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        ensure_success(resp).await.map(|_| ())
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn current_principal(&self) -> Result<Option<Principal>, SessionError> {
        match self.fetch_me().await {
            Err(SessionError::Unauthorized) => {
                // Access cookie expired: one refresh, one retry.
                if let Err(err) = self.refresh_tokens().await {
                    tracing::debug!(error = %err, "token refresh failed");
                    return Err(SessionError::Unauthorized);
                }
                self.fetch_me().await
            }
            other => other,
        }
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<(), SessionError> {
        self.post("/auth/login", Some(credentials)).await
    }

    async fn register(&self, form: &RegisterRequest) -> Result<(), SessionError> {
        self.post("/auth/register", Some(form)).await
    }

    async fn logout(&self) -> Result<(), SessionError> {
        self.post::<()>("/auth/logout", None).await
    }

    async fn refresh_tokens(&self) -> Result<(), SessionError> {
        self.post::<()>("/auth/refresh", None).await
    }
}

/// Map non-2xx responses onto [`SessionError`], keeping the server's message.
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, SessionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
    let message = resp
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .and_then(|body| body.message)
        .unwrap_or(fallback);

    Err(SessionError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let config = ClientConfig {
            api_url: "http://localhost:4000/api/".to_string(),
            request_timeout: Duration::from_secs(1),
            session_file: None,
        };
        let client = HttpIdentityClient::new(&config).unwrap();
        assert_eq!(client.url("/auth/me"), "http://localhost:4000/api/auth/me");
    }

    #[test]
    fn register_form_omits_empty_names() {
        let form = RegisterRequest {
            username: "asha".to_string(),
            email: "asha@college.edu".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("firstName").is_none());
        assert_eq!(json["username"], "asha");
    }

    #[test]
    fn register_form_uses_camel_case_names() {
        let form = RegisterRequest {
            username: "asha".to_string(),
            email: "asha@college.edu".to_string(),
            password: "pw".to_string(),
            first_name: Some("Asha".to_string()),
            last_name: Some("Rao".to_string()),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["firstName"], "Asha");
        assert_eq!(json["lastName"], "Rao");
        assert!(json.get("first_name").is_none());
    }

    #[test]
    fn me_envelope_accepts_null_user() {
        let envelope: UserEnvelope = serde_json::from_str(r#"{"user":null}"#).unwrap();
        assert!(envelope.user.is_none());
    }
}
