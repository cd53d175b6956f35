//! Application shell: one resolver, one store, guards handed to views.

use std::sync::Arc;

use placemate_auth::RouteDecision;

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::guard::RouteAuthorizer;
use crate::identity::{HttpIdentityClient, IdentityClient};
use crate::resolver::SessionResolver;
use crate::store::SessionStore;

/// Owns the session for the lifetime of the portal.
///
/// Construction runs the first identity check, so views created afterwards
/// never observe `Uninitialized`.
pub struct PortalShell<C = HttpIdentityClient> {
    resolver: Arc<SessionResolver<C>>,
}

impl PortalShell<HttpIdentityClient> {
    /// Build the HTTP client and store from `config`, then resolve the session.
    pub async fn start(config: &ClientConfig) -> Result<Self, SessionError> {
        let client = HttpIdentityClient::new(config)?;
        tracing::info!(api_url = %client.base_url(), "starting portal shell");
        Ok(Self::with_parts(client, config.session_store()).await)
    }
}

impl<C: IdentityClient> PortalShell<C> {
    pub async fn with_parts(client: C, store: Arc<dyn SessionStore>) -> Self {
        let resolver = Arc::new(SessionResolver::new(client, store));
        let session = resolver.initialize().await;
        tracing::debug!(status = ?session.status(), "initial session resolved");
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<SessionResolver<C>> {
        &self.resolver
    }

    /// A guard bound to this shell's session.
    pub fn authorizer(&self) -> RouteAuthorizer {
        RouteAuthorizer::new(self.resolver.subscribe(), self.resolver.store().clone())
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        self.resolver.store()
    }

    /// Decision for navigating to `path` right now.
    pub fn navigate(&self, path: &str) -> RouteDecision {
        self.authorizer().authorize(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placemate_auth::Role;

    use crate::identity::LoginRequest;
    use crate::resolver::tests::FakeIdentity;
    use crate::store::MemorySessionStore;

    #[tokio::test]
    async fn shell_is_resolved_after_construction() {
        let shell = PortalShell::with_parts(FakeIdentity::default(), Arc::new(MemorySessionStore::new())).await;
        assert!(!shell.resolver().session().is_loading());
        assert_eq!(shell.navigate("/admin"), RouteDecision::Redirect("/"));
    }

    #[tokio::test]
    async fn authorizer_tracks_login_and_logout() {
        let shell = PortalShell::with_parts(
            FakeIdentity::with_account("ravi", "pw", Role::Admin),
            Arc::new(MemorySessionStore::new()),
        )
        .await;
        let guard = shell.authorizer();

        shell.resolver().login(&LoginRequest::new("ravi", "pw")).await.unwrap();
        assert_eq!(guard.authorize("/admin/users"), RouteDecision::Render);
        assert_eq!(guard.landing(), RouteDecision::Redirect("/admin"));

        shell.resolver().logout().await;
        assert_eq!(guard.authorize("/admin/users"), RouteDecision::Redirect("/"));
        assert_eq!(shell.store().cached_role_hint(), None);
    }

    #[tokio::test]
    async fn start_against_unreachable_server_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            api_url: "http://127.0.0.1:9/api".to_string(),
            request_timeout: std::time::Duration::from_secs(2),
            session_file: Some(dir.path().join("session.json")),
        };

        let shell = PortalShell::start(&config).await.unwrap();

        assert_eq!(shell.navigate("/student/dashboard"), RouteDecision::Redirect("/"));
    }
}
