//! Session Resolver: keeps the client's view of the principal current.
//!
//! Every operation runs under one async lock, so transitions are applied in
//! call order and a second `login()` waits for the first to settle. Snapshots
//! go out on a `watch` channel; views subscribe instead of polling storage.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use placemate_auth::Principal;

use crate::error::SessionError;
use crate::identity::{IdentityClient, LoginRequest, RegisterRequest};
use crate::session::{Session, SessionState};
use crate::store::SessionStore;

/// What a resolved identity check does to the cached role hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HintPolicy {
    /// Leave an existing hint alone (first load).
    Keep,
    /// Overwrite the hint with the server's answer.
    Sync,
}

pub struct SessionResolver<C> {
    client: C,
    store: Arc<dyn SessionStore>,
    tx: watch::Sender<Session>,
    op_lock: Mutex<()>,
}

impl<C: IdentityClient> SessionResolver<C> {
    pub fn new(client: C, store: Arc<dyn SessionStore>) -> Self {
        let (tx, _rx) = watch::channel(Session::new());
        Self {
            client,
            store,
            tx,
            op_lock: Mutex::new(()),
        }
    }

    /// Latest snapshot.
    pub fn session(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// First identity check after start-up. Never fails: any error means
    /// "nobody is signed in".
    pub async fn initialize(&self) -> Session {
        let _guard = self.op_lock.lock().await;
        self.resolve(HintPolicy::Keep).await;
        self.session()
    }

    /// Log in, then re-derive the principal from the server.
    ///
    /// If the login call itself fails the session is left exactly as it was
    /// and the server's message is returned for display.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Principal, SessionError> {
        let _guard = self.op_lock.lock().await;
        if let Err(err) = self.client.login(credentials).await {
            tracing::info!(username = %credentials.username, error = %err, "login rejected");
            return Err(err);
        }
        self.establish().await
    }

    /// Create an account, then behave like a successful [`login`](Self::login).
    pub async fn register(&self, form: &RegisterRequest) -> Result<Principal, SessionError> {
        let _guard = self.op_lock.lock().await;
        if let Err(err) = self.client.register(form).await {
            tracing::info!(username = %form.username, error = %err, "registration rejected");
            return Err(err);
        }
        self.establish().await
    }

    /// End the session locally no matter what the server says.
    pub async fn logout(&self) {
        let _guard = self.op_lock.lock().await;
        if let Err(err) = self.client.logout().await {
            tracing::warn!(error = %err, "logout request failed; clearing local session anyway");
        }
        self.store.invalidate();
        self.publish(SessionState::Anonymous);
    }

    /// Re-run the identity check, e.g. after a profile change. Also brings
    /// the cached role hint back in line with the server.
    pub async fn refresh(&self) -> Session {
        let _guard = self.op_lock.lock().await;
        self.resolve(HintPolicy::Sync).await;
        self.session()
    }

    async fn establish(&self) -> Result<Principal, SessionError> {
        self.resolve(HintPolicy::Sync).await.ok_or(SessionError::NoSession)
    }

    /// Loading -> Authenticated | Anonymous. Caller holds `op_lock`.
    async fn resolve(&self, hints: HintPolicy) -> Option<Principal> {
        self.publish(SessionState::Loading);

        let principal = match self.client.current_principal().await {
            Ok(principal) => principal,
            Err(err) => {
                tracing::debug!(error = %err, "identity check failed; treating as anonymous");
                None
            }
        };

        match principal {
            Some(principal) => {
                if hints == HintPolicy::Sync {
                    self.store.remember_role(principal.role);
                }
                tracing::info!(principal_id = %principal.id, role = %principal.role, "session established");
                self.publish(SessionState::Authenticated(principal.clone()));
                Some(principal)
            }
            None => {
                self.store.invalidate();
                self.publish(SessionState::Anonymous);
                None
            }
        }
    }

    fn publish(&self, next: SessionState) {
        let current = self.tx.borrow().state().clone();
        debug_assert!(current.allows(&next), "illegal session transition {current:?} -> {next:?}");
        self.tx.send_replace(Session::from_state(next));
    }
}
