use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::Request, middleware::Next, response::Response};
use chrono::Utc;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;
use crate::cookies::{ACCESS_COOKIE, read_cookie};

/// Require a valid access cookie; inserts [`SessionContext`].
pub async fn session_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = read_cookie(req.headers(), ACCESS_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let claims = services.tokens.verify_access(&token, Utc::now()).map_err(|err| {
        tracing::debug!(error = %err, "access token rejected");
        ApiError::unauthorized("Token inactive")
    })?;

    req.extensions_mut()
        .insert(SessionContext::new(claims.sub, claims.role));

    Ok(next.run(req).await)
}

/// One `info` line per request.
pub async fn trace_requests(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
