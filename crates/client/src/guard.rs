//! Route guards wired to the live session.

use std::sync::Arc;

use tokio::sync::watch;

use placemate_auth::{AuthStatus, RouteDecision, RouteExplanation, explain_route, landing_route};

use crate::session::Session;
use crate::store::SessionStore;

/// Answers "may the current session see this path?" for the view layer.
///
/// Cheap to clone; every clone follows the same session.
#[derive(Debug, Clone)]
pub struct RouteAuthorizer {
    session: watch::Receiver<Session>,
    store: Arc<dyn SessionStore>,
}

impl RouteAuthorizer {
    pub fn new(session: watch::Receiver<Session>, store: Arc<dyn SessionStore>) -> Self {
        Self { session, store }
    }

    /// Decision for a navigation to `path`.
    pub fn authorize(&self, path: &str) -> RouteDecision {
        let explanation = self.explain(path);
        tracing::debug!(
            path = %explanation.path,
            decision = ?explanation.decision,
            reason = %explanation.reason,
            "route decision"
        );
        explanation.decision
    }

    pub fn explain(&self, path: &str) -> RouteExplanation {
        let (status, hint) = self.inputs();
        explain_route(status, hint.as_deref(), path)
    }

    /// Where the post-login landing route sends the current session.
    pub fn landing(&self) -> RouteDecision {
        let (status, hint) = self.inputs();
        landing_route(status, hint.as_deref())
    }

    pub fn status(&self) -> AuthStatus {
        self.session.borrow().status()
    }

    fn inputs(&self) -> (AuthStatus, Option<String>) {
        let status = self.status();
        // The hint only matters once a principal is known.
        let hint = match status {
            AuthStatus::Authenticated(_) => self.store.cached_role_hint(),
            AuthStatus::Loading | AuthStatus::Anonymous => None,
        };
        (status, hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placemate_auth::{Principal, Role};
    use placemate_core::PrincipalId;

    use crate::session::SessionState;
    use crate::store::MemorySessionStore;

    fn authorizer(state: SessionState, hint: Option<&str>) -> (watch::Sender<Session>, RouteAuthorizer) {
        let store: Arc<dyn SessionStore> = match hint {
            Some(h) => Arc::new(MemorySessionStore::with_hint(h)),
            None => Arc::new(MemorySessionStore::new()),
        };
        let (tx, rx) = watch::channel(Session::from_state(state));
        (tx, RouteAuthorizer::new(rx, store))
    }

    fn signed_in(role: Role) -> SessionState {
        SessionState::Authenticated(Principal::new(PrincipalId::new(), role))
    }

    #[test]
    fn uninitialized_session_shows_loading() {
        let (_tx, guard) = authorizer(SessionState::Uninitialized, Some("admin"));
        assert_eq!(guard.authorize("/admin"), RouteDecision::ShowLoading);
        assert_eq!(guard.landing(), RouteDecision::ShowLoading);
    }

    #[test]
    fn anonymous_goes_to_public_entry() {
        let (_tx, guard) = authorizer(SessionState::Anonymous, None);
        assert_eq!(guard.authorize("/student/dashboard"), RouteDecision::Redirect("/"));
        assert_eq!(guard.landing(), RouteDecision::Redirect("/"));
    }

    #[test]
    fn leftover_hint_is_ignored_while_anonymous() {
        let (_tx, guard) = authorizer(SessionState::Anonymous, Some("admin"));
        let explanation = guard.explain("/admin");
        assert_eq!(explanation.cached_hint, None);
        assert_eq!(explanation.decision, RouteDecision::Redirect("/"));
    }

    #[test]
    fn recruiter_is_confined_to_own_prefix() {
        let (_tx, guard) = authorizer(signed_in(Role::Recruiter), None);
        assert_eq!(guard.authorize("/recruiter/postjob"), RouteDecision::Render);
        assert_eq!(guard.authorize("/student/dashboard"), RouteDecision::Redirect("/recruiter/viewjobs"));
        assert_eq!(guard.landing(), RouteDecision::Redirect("/recruiter/viewjobs"));
    }

    #[test]
    fn cached_hint_takes_precedence() {
        let (_tx, guard) = authorizer(signed_in(Role::Student), Some("spoc"));
        assert_eq!(guard.authorize("/spoc/assignedjobs"), RouteDecision::Render);
        assert!(guard.explain("/spoc/assignedjobs").hint_overrides_session);
    }

    #[test]
    fn follows_session_updates() {
        let (tx, guard) = authorizer(SessionState::Loading, None);
        assert_eq!(guard.authorize("/admin/users"), RouteDecision::ShowLoading);

        tx.send_replace(Session::from_state(signed_in(Role::Admin)));
        assert_eq!(guard.authorize("/admin/users"), RouteDecision::Render);

        tx.send_replace(Session::from_state(SessionState::Anonymous));
        assert_eq!(guard.authorize("/admin/users"), RouteDecision::Redirect("/"));
    }
}
