//! The client's belief about who is signed in.

use placemate_auth::{AuthStatus, Principal};

/// Lifecycle of a session.
///
/// ```text
/// Uninitialized -> Loading -> Authenticated | Anonymous
/// Authenticated -> Loading (login, refresh) | Anonymous (logout)
/// Anonymous     -> Loading (login, refresh) | Anonymous (logout)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Authenticated(Principal),
    Anonymous,
}

impl SessionState {
    /// Whether `next` is a legal successor of `self`.
    ///
    /// `Authenticated` is only reachable from `Loading`, so no consumer can
    /// see a principal that skipped the loading phase.
    pub fn allows(&self, next: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Uninitialized, Loading)
                | (Uninitialized, Anonymous)
                | (Loading, Authenticated(_))
                | (Loading, Anonymous)
                | (Authenticated(_), Loading)
                | (Authenticated(_), Anonymous)
                | (Anonymous, Loading)
                | (Anonymous, Anonymous)
        )
    }
}

/// Snapshot published to every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
        }
    }

    pub(crate) fn from_state(state: SessionState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&Principal> {
        match &self.state {
            SessionState::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    /// True until the first identity check resolves, and while any later
    /// check is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Uninitialized | SessionState::Loading)
    }

    /// The only view of a session the route guards get.
    pub fn status(&self) -> AuthStatus {
        match &self.state {
            SessionState::Uninitialized | SessionState::Loading => AuthStatus::Loading,
            SessionState::Anonymous => AuthStatus::Anonymous,
            SessionState::Authenticated(principal) => AuthStatus::Authenticated(principal.role),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
