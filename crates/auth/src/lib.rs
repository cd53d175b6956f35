//! `placemate-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it decides,
//! it never fetches.

pub mod authorize;
pub mod claims;
pub mod principal;
pub mod roles;

pub use authorize::{
    AuthStatus, PUBLIC_ENTRY, RouteDecision, RouteExplanation, authorize_route,
    default_route_for_role, effective_role, explain_route, is_allowed_path, landing_route,
};
pub use claims::{TokenClaims, TokenKind, TokenValidationError, validate_claims};
pub use principal::Principal;
pub use roles::Role;
