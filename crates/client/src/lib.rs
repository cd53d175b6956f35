//! `placemate-client`
//!
//! **Responsibility:** client-side session state and route guarding.
//!
//! This crate provides:
//! - Session resolution against the identity endpoints (cookie sessions)
//! - A cached role hint that is readable synchronously before the session resolves
//! - Route guards that turn (session, path) into render / redirect / loading
//!
//! The server remains the authority on who the user is; the client only
//! remembers what it was last told.

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod resolver;
pub mod session;
pub mod shell;
pub mod store;

pub use config::{ClientConfig, ConfigError};
pub use error::SessionError;
pub use guard::RouteAuthorizer;
pub use identity::{HttpIdentityClient, IdentityClient, LoginRequest, RegisterRequest};
pub use resolver::SessionResolver;
pub use session::{Session, SessionState};
pub use shell::PortalShell;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
