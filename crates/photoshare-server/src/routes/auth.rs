//! Authentication endpoints: login, signup, refresh, logout, tenant
//! assignment, and the current-user view.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Extension, Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use photoshare_auth::service::{AssignTenantInput, LoginInput, SignupInput};
use photoshare_auth::AuthTokens;
use photoshare_core::error::CoreError;
use serde::Deserialize;
use serde_json::json;

use crate::cookies::{self, REFRESH_COOKIE};
use crate::error::ApiError;
use crate::middleware::Authenticated;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub tenant_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTenantRequest {
    pub tenant_code: String,
}

/// Build a token response: user payload in the body, credentials in
/// HttpOnly cookies only.
fn token_response(state: &AppState, status: StatusCode, tokens: AuthTokens) -> Response {
    let body = Json(json!({ "user": tokens.user }));
    let mut response = (status, body).into_response();
    cookies::set_auth_cookies(&mut response, &tokens, state.config.cookie_secure);
    response
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let tokens = state
        .auth
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(token_response(&state, StatusCode::OK, tokens))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let tokens = state
        .auth
        .signup(SignupInput {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            tenant_code: body.tenant_code,
            identifier: Some(addr.ip().to_string()),
        })
        .await?;
    Ok(token_response(&state, StatusCode::CREATED, tokens))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<Response, ApiError> {
    let raw = cookies::cookie_value(&headers, REFRESH_COOKIE).ok_or_else(|| {
        CoreError::AuthenticationFailed {
            reason: "missing refresh token".into(),
        }
    })?;
    let tokens = state.auth.refresh(&raw).await?;
    Ok(token_response(&state, StatusCode::OK, tokens))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(raw) = cookies::cookie_value(&headers, REFRESH_COOKIE) {
        state.auth.logout(&raw).await?;
    }
    let mut response = Json(json!({ "detail": "signed out" })).into_response();
    cookies::clear_auth_cookies(&mut response, state.config.cookie_secure);
    Ok(response)
}

pub async fn me(Extension(auth): Extension<Authenticated>) -> Response {
    Json(json!({ "user": auth.user })).into_response()
}

/// Join a tenant with a one-time code. Re-issues the token pair so the
/// new tenant claim takes effect immediately.
pub async fn assign_tenant(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(auth): Extension<Authenticated>,
    Json(body): Json<AssignTenantRequest>,
) -> Result<Response, ApiError> {
    state
        .auth
        .assign_tenant(AssignTenantInput {
            user_id: auth.user.id,
            tenant_code: body.tenant_code,
            identifier: Some(addr.ip().to_string()),
            admin_override: false,
        })
        .await?;

    // Old claims carry no tenant; re-issue cookies from current state.
    let tokens = state.auth.reissue(auth.user.id).await?;
    Ok(token_response(&state, StatusCode::OK, tokens))
}
