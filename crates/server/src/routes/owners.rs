//! Owner account routes.
//!
//! Registration is gated: only the allow-listed email may create an owner
//! account, and a non-allow-listed attempt is 403, not 400 - the request is
//! well-formed, the caller just isn't permitted.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::middleware::RequireOwner;
use crate::models::PublicOwner;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /owners/register
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let owner = state
        .auth()
        .register_owner(&req.name, &req.email, &req.password)
        .await?;

    tracing::info!(owner_id = %owner.id, "owner registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": PublicOwner::from(&owner) })),
    ))
}

/// POST /owners/login
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (owner, pair) = state.auth().login_owner(&req.email, &req.password).await?;

    tracing::info!(owner_id = %owner.id, "owner logged in");

    Ok(Json(json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
        "user": PublicOwner::from(&owner),
    })))
}

/// GET /owners/profile
#[tracing::instrument(skip_all)]
pub async fn profile(RequireOwner(owner): RequireOwner) -> Result<impl IntoResponse> {
    Ok(Json(json!({ "user": PublicOwner::from(&owner) })))
}

/// POST /owners/logout
#[tracing::instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
) -> Result<impl IntoResponse> {
    state
        .auth()
        .logout(&crate::models::Principal::Owner(owner))
        .await?;
    Ok(Json(json!({ "message": "logged out" })))
}
