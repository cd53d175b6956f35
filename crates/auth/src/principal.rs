use serde::{Deserialize, Serialize};

use placemate_core::PrincipalId;

use crate::Role;

/// The resolved identity of the current user, as the backend knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,

    /// Role-less users are treated as students.
    #[serde(default = "default_role")]
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub profile_completed: bool,

    #[serde(default)]
    pub is_verified: bool,
}

fn default_role() -> Role {
    Role::Student
}

impl Principal {
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self {
            id,
            role,
            email: None,
            username: None,
            name: None,
            profile_completed: false,
            is_verified: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}
