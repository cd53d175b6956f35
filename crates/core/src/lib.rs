//! `placemate-core`: foundation types shared by the portal crates.
//!
//! Pure primitives only: no IO, no HTTP, no storage.

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::PrincipalId;
pub use value_object::EmailAddress;
