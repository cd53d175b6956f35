//! Service wiring: user directory, token service, password hasher.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Context;
use serde::Deserialize;

use placemate_auth::{Principal, Role};
use placemate_core::{DomainError, DomainResult, EmailAddress, PrincipalId};

use crate::config::ApiConfig;
use crate::cookies::CookiePolicy;
use crate::password::PasswordHasherService;
use crate::tokens::TokenService;

/// Everything the handlers need, shared behind one `Arc`.
#[derive(Debug)]
pub struct AppServices {
    pub users: UserDirectory,
    pub tokens: TokenService,
    pub passwords: PasswordHasherService,
    pub cookies: CookiePolicy,
}

impl AppServices {
    /// Build services and load the optional users seed file.
    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Arc<Self>> {
        let services = Self {
            users: UserDirectory::default(),
            tokens: TokenService::new(config),
            passwords: PasswordHasherService::new(),
            cookies: CookiePolicy::new(config.cookie_secure),
        };

        if let Some(path) = &config.users_file {
            let seeded = services.seed_from_file(path)?;
            tracing::info!(path = %path.display(), count = seeded, "seeded user directory");
        }

        Ok(Arc::new(services))
    }

    pub fn seed_from_file(&self, path: &Path) -> anyhow::Result<usize> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read users file {}", path.display()))?;
        let seed: Vec<SeedUser> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse users file {}", path.display()))?;
        self.seed(seed)
    }

    pub fn seed(&self, users: Vec<SeedUser>) -> anyhow::Result<usize> {
        let count = users.len();
        for user in users {
            let username = user.username.clone();
            let password = user.password.clone();
            self.create_user(user.into_new_user(), &password)
                .with_context(|| format!("failed to seed user {username}"))?;
        }
        Ok(count)
    }

    /// Hash the password and add the account.
    pub fn create_user(&self, new_user: NewUser, password: &str) -> anyhow::Result<Principal> {
        let hash = self.passwords.hash_password(password)?;
        Ok(self.users.insert(new_user, hash)?)
    }
}

/// Entry of the users seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "student")]
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

fn student() -> Role {
    Role::Student
}

impl SeedUser {
    fn into_new_user(self) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email,
            role: self.role,
            name: self.name,
        }
    }
}

/// Account details; validated by [`UserDirectory::insert`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub principal: Principal,
    pub password_hash: String,
}

/// In-memory accounts, unique on username and e-mail (case-insensitive).
#[derive(Debug, Default)]
pub struct UserDirectory {
    inner: RwLock<HashMap<PrincipalId, UserRecord>>,
}

impl UserDirectory {
    pub fn insert(&self, new_user: NewUser, password_hash: String) -> DomainResult<Principal> {
        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::validation("username must not be empty"));
        }
        let email = EmailAddress::parse(&new_user.email)?;

        let mut users = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let taken = users.values().any(|u| {
            u.principal.email.as_deref() == Some(email.as_str())
                || u.principal
                    .username
                    .as_deref()
                    .is_some_and(|existing| existing.eq_ignore_ascii_case(&username))
        });
        if taken {
            return Err(DomainError::conflict("User already exists"));
        }

        let mut principal = Principal::new(PrincipalId::new(), new_user.role)
            .with_username(username)
            .with_email(email.as_str());
        principal.name = new_user.name;

        users.insert(
            principal.id,
            UserRecord {
                principal: principal.clone(),
                password_hash,
            },
        );
        Ok(principal)
    }

    pub fn get(&self, id: PrincipalId) -> Option<Principal> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|u| u.principal.clone())
    }

    /// Look up by username or e-mail.
    pub fn find_by_login(&self, login: &str) -> Option<UserRecord> {
        let login = login.trim().to_lowercase();
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|u| {
                u.principal.email.as_deref() == Some(login.as_str())
                    || u.principal
                        .username
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase() == login)
            })
            .cloned()
    }

    /// Overwrite a stored role. `/auth/me` reports it on the next call; live
    /// tokens keep the old role until they are reissued.
    pub fn set_role(&self, id: PrincipalId, role: Role) -> DomainResult<Principal> {
        let mut users = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let record = users.get_mut(&id).ok_or_else(DomainError::not_found)?;
        record.principal.role = role;
        Ok(record.principal.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
