use serde::{Deserialize, Serialize};

use placemate_auth::Principal;

/// `POST /auth/login`. Either `username` or `email` identifies the account.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Login name and password, when both are present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let login = non_blank(&self.username).or_else(|| non_blank(&self.email))?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((login, password))
    }
}

/// `POST /auth/register`. Name fields arrive as `firstName`/`lastName`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl RegisterRequest {
    /// `"First Last"`, or whichever half is present.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [non_blank(&self.first_name), non_blank(&self.last_name)]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Principal,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
