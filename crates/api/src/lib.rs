//! `placemate-api`: identity service for the placement portal.
//!
//! Cookie sessions over short-lived access tokens and rotating refresh
//! tokens. The role a client sees always comes from the user directory.

pub mod app;
pub mod config;
pub mod context;
pub mod cookies;
pub mod middleware;
pub mod password;
pub mod tokens;

pub use app::{AppServices, build_app};
pub use config::ApiConfig;
