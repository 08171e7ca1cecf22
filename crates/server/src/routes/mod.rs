//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (pings the database)
//!
//! # Customer accounts
//! POST   /users/register          - Register a customer
//! POST   /users/login             - Login (email or phone + password)
//! POST   /users/refresh           - Redeem a refresh token for a new pair
//! POST   /users/logout            - Logout (clears refresh token)
//! GET    /users/me                - Current principal
//!
//! # Owner accounts (registration allow-listed)
//! POST   /owners/register         - Register the owner
//! POST   /owners/login            - Owner login
//! POST   /owners/logout           - Owner logout
//! GET    /owners/profile          - Owner profile
//!
//! # Cart (customer-only; every mutation responds with the full cart)
//! POST   /cart/add                - Add qty to a line (upsert)
//! GET    /cart/                   - Resolved cart
//! DELETE /cart/{product_id}       - Remove a line
//!
//! # Likes (customer-only)
//! POST   /likes/toggle/{video_id} - Toggle a like, returns count + state
//! ```

pub mod cart;
pub mod likes;
pub mod owners;
pub mod users;

use axum::{
    Json,
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::json;

use crate::state::AppState;

/// Create the customer account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/refresh", post(users::refresh))
        .route("/logout", post(users::logout))
        .route("/me", get(users::me))
}

/// Create the owner account routes router.
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(owners::register))
        .route("/login", post(owners::login))
        .route("/logout", post(owners::logout))
        .route("/profile", get(owners::profile))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/{product_id}", delete(cart::remove))
}

/// Create the like routes router.
pub fn like_routes() -> Router<AppState> {
    Router::new().route("/toggle/{video_id}", post(likes::toggle))
}

/// Liveness check.
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness check: verifies the database answers.
async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(health_ready))
        .nest("/users", user_routes())
        .nest("/owners", owner_routes())
        .nest("/cart", cart_routes())
        .nest("/likes", like_routes())
}
