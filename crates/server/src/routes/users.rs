//! Customer account routes: register, login, refresh, logout.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, cookie_value};
use crate::models::{Principal, PublicCustomer};
use crate::services::auth::TokenPair;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email or phone number - either identifier logs in.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token in the body, for clients that don't use cookies.
    pub refresh_token: Option<String>,
}

/// `Set-Cookie` headers installing the token pair for browser clients.
///
/// Both cookies are `HttpOnly`: scripts never see the tokens, the browser
/// just replays them.
fn token_cookies(pair: &TokenPair) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    AppendHeaders([
        (
            header::SET_COOKIE,
            format!(
                "{ACCESS_TOKEN_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/",
                pair.access_token
            ),
        ),
        (
            header::SET_COOKIE,
            format!(
                "{REFRESH_TOKEN_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/",
                pair.refresh_token
            ),
        ),
    ])
}

/// `Set-Cookie` headers clearing both token cookies.
fn clear_cookies() -> AppendHeaders<[(header::HeaderName, String); 2]> {
    AppendHeaders([
        (
            header::SET_COOKIE,
            format!("{ACCESS_TOKEN_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"),
        ),
        (
            header::SET_COOKIE,
            format!("{REFRESH_TOKEN_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"),
        ),
    ])
}

/// POST /users/register
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let customer = state
        .auth()
        .register_customer(&req.username, &req.email, &req.phone_number, &req.password)
        .await?;

    tracing::info!(customer_id = %customer.id, "customer registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": PublicCustomer::from(&customer) })),
    ))
}

/// POST /users/login
///
/// Returns the token pair in the body and as `HttpOnly` cookies, so both
/// header-based and cookie-based clients work.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (customer, pair) = state
        .auth()
        .login_customer(&req.identifier, &req.password)
        .await?;

    tracing::info!(customer_id = %customer.id, "customer logged in");

    let body = json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
        "user": PublicCustomer::from(&customer),
    });
    Ok((token_cookies(&pair), Json(body)))
}

/// POST /users/refresh
///
/// Redeems a refresh token (body field or `refreshToken` cookie) for a fresh
/// pair. A replayed token gets 401; the client must log in again.
#[tracing::instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse> {
    let token = body
        .and_then(|Json(req)| req.refresh_token)
        .or_else(|| cookie_value(&headers, REFRESH_TOKEN_COOKIE))
        .ok_or_else(|| AppError::Unauthorized("missing refresh token".to_owned()))?;

    let (principal, pair) = state.auth().redeem_refresh(&token).await?;

    tracing::debug!(subject = %principal.id(), "refresh token rotated");

    let body = json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    });
    Ok((token_cookies(&pair), Json(body)))
}

/// POST /users/logout
///
/// Clears the live refresh token server-side and expires both cookies.
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse> {
    state.auth().logout(&principal).await?;
    tracing::info!(subject = %principal.id(), kind = %principal.kind(), "logged out");
    Ok((clear_cookies(), Json(json!({ "message": "logged out" }))))
}

/// GET /users/me
#[tracing::instrument(skip_all)]
pub async fn me(RequireAuth(principal): RequireAuth) -> Result<impl IntoResponse> {
    let body = match &principal {
        Principal::Customer(c) => json!({ "user": PublicCustomer::from(c) }),
        Principal::Owner(o) => json!({ "user": crate::models::PublicOwner::from(o) }),
    };
    Ok(Json(body))
}
