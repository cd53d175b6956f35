use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::middleware;

pub mod auth;
pub mod system;

/// Every endpoint, relative to the `/api` mount point.
pub fn router(services: Arc<AppServices>) -> Router {
    // Only `/auth/me` needs a live access token; refresh and logout read
    // the refresh cookie themselves.
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route_layer(axum::middleware::from_fn_with_state(
            services,
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .merge(protected)
}
