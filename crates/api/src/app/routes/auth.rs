//! `/auth/*`: cookie-session login, registration, refresh and logout.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use chrono::Utc;

use placemate_auth::{Principal, Role};

use crate::app::dto::{LoginRequest, MessageResponse, RegisterRequest, UserResponse, non_blank};
use crate::app::errors::ApiError;
use crate::app::services::{AppServices, NewUser};
use crate::context::SessionContext;
use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE, read_cookie};

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let Some((login, password)) = req.credentials() else {
        return Err(ApiError::bad_request("Username and password are required"));
    };

    let Some(record) = services.users.find_by_login(login) else {
        tracing::info!(login, "login for unknown account");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&services, password, &record.password_hash).await? {
        tracing::info!(principal_id = %record.principal.id, "login with wrong password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    tracing::info!(principal_id = %record.principal.id, role = %record.principal.role, "login succeeded");
    start_session(&services, record.principal, StatusCode::OK)
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (Some(username), Some(email), Some(password)) =
        (non_blank(&req.username), non_blank(&req.email), req.password.as_deref().filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::bad_request("Username, email, and password are required"));
    };

    if services.users.find_by_login(username).is_some() || services.users.find_by_login(email).is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }

    let hash = hash_password(&services, password).await?;
    let principal = services.users.insert(
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            role: Role::Student,
            name: req.display_name(),
        },
        hash,
    )?;

    tracing::info!(principal_id = %principal.id, "account registered");
    start_session(&services, principal, StatusCode::CREATED)
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<UserResponse>, ApiError> {
    // Re-read the directory so role changes show up before the token expires.
    let user = services
        .users
        .get(session.principal_id())
        .ok_or_else(|| ApiError::unauthorized("Token inactive"))?;
    if user.role != session.role() {
        tracing::debug!(principal_id = %user.id, token_role = %session.role(), role = %user.role, "role changed since token issue");
    }
    Ok(Json(UserResponse { user }))
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = read_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("Missing refresh token"))?;

    let claims = services.tokens.verify_refresh(&token, Utc::now()).map_err(|err| {
        tracing::debug!(error = %err, "refresh token rejected");
        ApiError::unauthorized("Refresh failed")
    })?;

    let user = services
        .users
        .get(claims.sub)
        .ok_or_else(|| ApiError::unauthorized("Refresh failed"))?;

    tracing::debug!(principal_id = %user.id, "tokens rotated");
    start_session(&services, user, StatusCode::OK)
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = read_cookie(&headers, REFRESH_COOKIE) {
        if services.tokens.revoke(&token) {
            tracing::info!("refresh token revoked");
        }
    }

    let cookies = &services.cookies;
    (
        AppendHeaders([
            (SET_COOKIE, cookies.build_delete_cookie(ACCESS_COOKIE)),
            (SET_COOKIE, cookies.build_delete_cookie(REFRESH_COOKIE)),
        ]),
        Json(MessageResponse { message: "Logged out" }),
    )
}

/// Mint a token pair, set both cookies, and return `{user}`.
fn start_session(services: &AppServices, user: Principal, status: StatusCode) -> Result<Response, ApiError> {
    let pair = services
        .tokens
        .issue_pair(&user, Utc::now())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let cookies = &services.cookies;
    Ok((
        status,
        AppendHeaders([
            (
                SET_COOKIE,
                cookies.build_set_cookie(ACCESS_COOKIE, &pair.access, services.tokens.access_ttl()),
            ),
            (
                SET_COOKIE,
                cookies.build_set_cookie(REFRESH_COOKIE, &pair.refresh, services.tokens.refresh_ttl()),
            ),
        ]),
        Json(UserResponse { user }),
    )
        .into_response())
}

async fn hash_password(services: &Arc<AppServices>, password: &str) -> Result<String, ApiError> {
    let services = services.clone();
    let password = password.to_string();
    tokio::task::spawn_blocking(move || services.passwords.hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|e| ApiError::internal(e.to_string()))
}

async fn verify_password(services: &Arc<AppServices>, password: &str, hash: &str) -> Result<bool, ApiError> {
    let services = services.clone();
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || services.passwords.verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|e| ApiError::internal(e.to_string()))
}
