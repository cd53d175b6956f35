//! Route authorization: which view a session may see.
//!
//! - No IO
//! - No panics
//! - Case-insensitive on both role and path

use serde::Serialize;

use crate::Role;
use crate::roles::RESERVED_PREFIXES;

/// Where anonymous visitors are sent.
pub const PUBLIC_ENTRY: &str = "/";

/// What the authorizer knows about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "role", rename_all = "snake_case")]
pub enum AuthStatus {
    /// The identity check has not resolved yet.
    Loading,
    /// Resolved, and nobody is signed in.
    Anonymous,
    /// Resolved to a principal with this server-side role.
    Authenticated(Role),
}

/// Outcome for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "to", rename_all = "snake_case")]
pub enum RouteDecision {
    Render,
    Redirect(&'static str),
    ShowLoading,
}

/// Whether `role` may view `path`.
///
/// Portal roles are confined to their own prefix; every other role may go
/// anywhere except the four reserved prefixes.
pub fn is_allowed_path(role: Role, path: &str) -> bool {
    let path = path.to_lowercase();
    match role.reserved_prefix() {
        Some(prefix) => path.starts_with(prefix),
        None => !RESERVED_PREFIXES.iter().any(|p| path.starts_with(p)),
    }
}

/// Landing view for a role.
pub fn default_route_for_role(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::Recruiter => "/recruiter/viewjobs",
        Role::Spoc => "/spoc/assignedjobs",
        Role::Student => "/student/dashboard",
        Role::Unauthenticated | Role::Unrecognized => PUBLIC_ENTRY,
    }
}

/// The role routing decisions are made with.
///
/// A non-blank cached hint (written at login) wins over the session's own
/// role. The hint can be stale until the session is refreshed.
pub fn effective_role(cached_hint: Option<&str>, session_role: Role) -> Role {
    match cached_hint.map(str::trim).filter(|hint| !hint.is_empty()) {
        Some(hint) => Role::parse(hint),
        None => session_role,
    }
}

/// Decide what to do when `status` navigates to `path`.
pub fn authorize_route(status: AuthStatus, cached_hint: Option<&str>, path: &str) -> RouteDecision {
    match status {
        AuthStatus::Loading => RouteDecision::ShowLoading,
        AuthStatus::Anonymous => RouteDecision::Redirect(PUBLIC_ENTRY),
        AuthStatus::Authenticated(session_role) => {
            let role = effective_role(cached_hint, session_role);
            if is_allowed_path(role, path) {
                RouteDecision::Render
            } else {
                RouteDecision::Redirect(default_route_for_role(role))
            }
        }
    }
}

/// Decide where the post-login landing route sends `status`.
pub fn landing_route(status: AuthStatus, cached_hint: Option<&str>) -> RouteDecision {
    match status {
        AuthStatus::Loading => RouteDecision::ShowLoading,
        AuthStatus::Anonymous => RouteDecision::Redirect(PUBLIC_ENTRY),
        AuthStatus::Authenticated(session_role) => {
            RouteDecision::Redirect(default_route_for_role(effective_role(cached_hint, session_role)))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of a route decision.
///
/// Answers "why was I bounced to this page?" without re-running the logic by
/// hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteExplanation {
    pub path: String,
    pub status: AuthStatus,
    pub cached_hint: Option<String>,
    /// `None` while loading or anonymous.
    pub effective_role: Option<Role>,
    /// True when the hint disagrees with the session role.
    pub hint_overrides_session: bool,
    pub decision: RouteDecision,
    pub reason: String,
}

/// Explain the decision [`authorize_route`] makes for the same inputs.
pub fn explain_route(status: AuthStatus, cached_hint: Option<&str>, path: &str) -> RouteExplanation {
    let decision = authorize_route(status, cached_hint, path);
    let cached = cached_hint.map(str::to_string);

    let (effective, overrides, reason) = match status {
        AuthStatus::Loading => (None, false, "session check still in flight".to_string()),
        AuthStatus::Anonymous => (
            None,
            false,
            format!("no active session; sending visitor to {PUBLIC_ENTRY}"),
        ),
        AuthStatus::Authenticated(session_role) => {
            let role = effective_role(cached_hint, session_role);
            let overrides = role != session_role;
            let reason = match decision {
                RouteDecision::Render => match role.reserved_prefix() {
                    Some(prefix) => format!("role '{role}' owns prefix {prefix}"),
                    None => format!("role '{role}' may view non-reserved paths"),
                },
                RouteDecision::Redirect(to) => match role.reserved_prefix() {
                    Some(prefix) => {
                        format!("role '{role}' is confined to {prefix}; redirecting to {to}")
                    }
                    None => format!("role '{role}' may not view reserved paths; redirecting to {to}"),
                },
                RouteDecision::ShowLoading => String::new(),
            };
            (Some(role), overrides, reason)
        }
    };

    RouteExplanation {
        path: path.to_string(),
        status,
        cached_hint: cached,
        effective_role: effective,
        hint_overrides_session: overrides,
        decision,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTAL_ROLES: [Role; 4] = [Role::Admin, Role::Recruiter, Role::Spoc, Role::Student];

    #[test]
    fn mixed_case_recruiter_may_view_jobs() {
        let role = Role::parse("Recruiter");
        assert!(is_allowed_path(role, "/recruiter/viewjobs"));
        assert_eq!(
            authorize_route(AuthStatus::Authenticated(role), None, "/recruiter/viewjobs"),
            RouteDecision::Render
        );
    }

    #[test]
    fn spoc_is_bounced_from_admin_pages() {
        let decision = authorize_route(AuthStatus::Authenticated(Role::Spoc), None, "/admin/dashboard");
        assert_eq!(decision, RouteDecision::Redirect("/spoc/assignedjobs"));
    }

    #[test]
    fn loading_session_never_redirects() {
        let decision = authorize_route(AuthStatus::Loading, Some("admin"), "/student/dashboard");
        assert_eq!(decision, RouteDecision::ShowLoading);
    }

    #[test]
    fn anonymous_visitor_goes_to_public_entry() {
        for path in ["/admin", "/student/dashboard", "/spoc/assignedjobs", "/"] {
            assert_eq!(
                authorize_route(AuthStatus::Anonymous, None, path),
                RouteDecision::Redirect(PUBLIC_ENTRY)
            );
        }
    }

    #[test]
    fn unrecognized_role_may_view_public_paths_only() {
        let role = Role::parse("unknown_role");
        assert!(is_allowed_path(role, "/"));
        assert!(is_allowed_path(role, "/alumni"));
        assert!(!is_allowed_path(role, "/student/dashboard"));
        assert_eq!(
            authorize_route(AuthStatus::Authenticated(role), None, "/admin"),
            RouteDecision::Redirect("/")
        );
    }

    #[test]
    fn path_matching_ignores_case() {
        assert!(is_allowed_path(Role::Admin, "/Admin/Companies"));
        assert!(!is_allowed_path(Role::Unrecognized, "/SPOC"));
    }

    #[test]
    fn cached_hint_wins_over_session_role() {
        let decision =
            authorize_route(AuthStatus::Authenticated(Role::Student), Some("admin"), "/admin/stats");
        assert_eq!(decision, RouteDecision::Render);

        let decision = authorize_route(
            AuthStatus::Authenticated(Role::Student),
            Some("admin"),
            "/student/dashboard",
        );
        assert_eq!(decision, RouteDecision::Redirect("/admin"));
    }

    #[test]
    fn blank_hint_falls_back_to_session_role() {
        assert_eq!(effective_role(Some("   "), Role::Spoc), Role::Spoc);
        assert_eq!(effective_role(None, Role::Recruiter), Role::Recruiter);
        assert_eq!(effective_role(Some("SPOC"), Role::Student), Role::Spoc);
    }

    #[test]
    fn landing_route_follows_effective_role() {
        assert_eq!(landing_route(AuthStatus::Loading, None), RouteDecision::ShowLoading);
        assert_eq!(landing_route(AuthStatus::Anonymous, Some("admin")), RouteDecision::Redirect("/"));
        assert_eq!(
            landing_route(AuthStatus::Authenticated(Role::Student), None),
            RouteDecision::Redirect("/student/dashboard")
        );
        assert_eq!(
            landing_route(AuthStatus::Authenticated(Role::Student), Some("recruiter")),
            RouteDecision::Redirect("/recruiter/viewjobs")
        );
    }

    #[test]
    fn every_default_route_is_allowed_for_its_role() {
        for role in PORTAL_ROLES.into_iter().chain([Role::Unauthenticated, Role::Unrecognized]) {
            assert!(is_allowed_path(role, default_route_for_role(role)), "{role} would loop");
        }
    }

    #[test]
    fn explanation_reports_stale_hint() {
        let explanation =
            explain_route(AuthStatus::Authenticated(Role::Student), Some("admin"), "/admin");
        assert_eq!(explanation.effective_role, Some(Role::Admin));
        assert!(explanation.hint_overrides_session);
        assert_eq!(explanation.decision, RouteDecision::Render);

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["status"]["status"], "authenticated");
        assert_eq!(json["status"]["role"], "student");
        assert_eq!(json["decision"]["outcome"], "render");
    }

    #[test]
    fn explanation_for_redirect_names_the_target() {
        let explanation =
            explain_route(AuthStatus::Authenticated(Role::Spoc), None, "/admin/dashboard");
        assert_eq!(explanation.decision, RouteDecision::Redirect("/spoc/assignedjobs"));
        assert!(explanation.reason.contains("/spoc/assignedjobs"));
        assert!(!explanation.hint_overrides_session);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn portal_role() -> impl Strategy<Value = Role> {
            prop::sample::select(PORTAL_ROLES.to_vec())
        }

        fn any_role() -> impl Strategy<Value = Role> {
            prop::sample::select(vec![
                Role::Admin,
                Role::Recruiter,
                Role::Spoc,
                Role::Student,
                Role::Unauthenticated,
                Role::Unrecognized,
            ])
        }

        proptest! {
            /// Property: a loading session only ever shows the spinner.
            #[test]
            fn loading_only_shows_loading(
                path in "/[a-z/]{0,30}",
                hint in proptest::option::of("[a-zA-Z]{0,10}")
            ) {
                prop_assert_eq!(
                    authorize_route(AuthStatus::Loading, hint.as_deref(), &path),
                    RouteDecision::ShowLoading
                );
            }

            /// Property: anonymous sessions are always sent to the public entry.
            #[test]
            fn anonymous_always_redirects_to_entry(path in "/[a-z/]{0,30}") {
                prop_assert_eq!(
                    authorize_route(AuthStatus::Anonymous, None, &path),
                    RouteDecision::Redirect(PUBLIC_ENTRY)
                );
            }

            /// Property: anything under a role's own prefix is allowed.
            #[test]
            fn own_prefix_is_allowed(role in portal_role(), rest in "[a-z0-9/]{0,30}") {
                let path = format!("{}{}", role.reserved_prefix().unwrap(), rest);
                prop_assert!(is_allowed_path(role, &path));
            }

            /// Property: paths outside a role's prefix are denied and redirect home.
            #[test]
            fn foreign_path_redirects_to_default(role in portal_role(), path in "/[a-z0-9/]{0,30}") {
                let prefix = role.reserved_prefix().unwrap();
                prop_assume!(!path.starts_with(prefix));

                prop_assert!(!is_allowed_path(role, &path));
                prop_assert_eq!(
                    authorize_route(AuthStatus::Authenticated(role), None, &path),
                    RouteDecision::Redirect(default_route_for_role(role))
                );
            }

            /// Property: following a redirect never yields another redirect.
            #[test]
            fn redirects_settle_in_one_hop(role in any_role(), path in "/[a-z0-9/]{0,30}") {
                let status = AuthStatus::Authenticated(role);
                if let RouteDecision::Redirect(to) = authorize_route(status, None, &path) {
                    prop_assert_eq!(authorize_route(status, None, to), RouteDecision::Render);
                }
            }
        }
    }
}
