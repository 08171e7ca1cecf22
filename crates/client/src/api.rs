//! Transport layer: API traits plus the reqwest implementation.
//!
//! The traits exist so the mutators and the reconciliation engine can be
//! exercised against a fake in tests; [`HttpApi`] is the one real
//! implementation. Failure classification matters more than failure detail:
//! the mutators only ever ask "was this an auth failure or not".

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use tiffinbox_core::{CartLine, ProductId, VideoId};

use crate::session::Session;

/// Transport-level error, pre-classified for the mutators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("server responded {0}")]
    Status(u16),

    /// The request never completed (DNS, refused, timeout...).
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Whether this failure means the credential is no good (401/403) and
    /// the only recovery is logging in again.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Status(401 | 403))
    }
}

/// Authoritative like state as the server reports it after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LikeState {
    pub likes_count: i64,
    pub is_liked: bool,
}

/// Cart operations against the authoritative server cart.
///
/// Every mutation responds with the full resolved cart, so callers replace
/// their local copy wholesale instead of patching it.
pub trait CartApi {
    /// Add `qty` of a product to the cart.
    fn add_item(
        &self,
        session: &Session,
        product_id: ProductId,
        qty: u32,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>>;

    /// Apply a signed quantity delta to an existing line. The server floors
    /// the quantity at 1; lowering a line to zero is [`Self::remove_item`]'s
    /// job.
    fn change_qty(
        &self,
        session: &Session,
        product_id: ProductId,
        delta: i32,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>>;

    /// Fetch the resolved cart.
    fn fetch_cart(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>>;

    /// Remove a product's line from the cart.
    fn remove_item(
        &self,
        session: &Session,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>>;
}

/// Like toggling.
pub trait LikeApi {
    /// Toggle the like on a video, returning the authoritative state.
    fn toggle_like(
        &self,
        session: &Session,
        video_id: VideoId,
    ) -> impl Future<Output = Result<LikeState, ApiError>>;
}

/// Login and refresh.
pub trait AuthApi {
    /// Login with an email-or-phone identifier.
    fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, ApiError>>;

    /// Redeem a refresh token for a fresh pair. The old pair is dead
    /// whether or not this succeeds.
    fn refresh(&self, session: &Session) -> impl Future<Output = Result<Session, ApiError>>;
}

// =============================================================================
// reqwest implementation
// =============================================================================

#[derive(Debug, Deserialize)]
struct CartEnvelope {
    cart: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    access_token: String,
    refresh_token: String,
}

/// HTTP transport over reqwest.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a transport for the given base URL (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Check the status, then deserialize the body.
    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl CartApi for HttpApi {
    async fn add_item(
        &self,
        session: &Session,
        product_id: ProductId,
        qty: u32,
    ) -> Result<Vec<CartLine>, ApiError> {
        let response = self
            .client
            .post(self.url("/cart/add"))
            .bearer_auth(&session.access_token)
            .json(&json!({ "product_id": product_id, "qty": qty }))
            .send()
            .await?;
        Ok(Self::parse::<CartEnvelope>(response).await?.cart)
    }

    async fn change_qty(
        &self,
        session: &Session,
        product_id: ProductId,
        delta: i32,
    ) -> Result<Vec<CartLine>, ApiError> {
        let response = self
            .client
            .post(self.url("/cart/add"))
            .bearer_auth(&session.access_token)
            .json(&json!({ "product_id": product_id, "qty": delta }))
            .send()
            .await?;
        Ok(Self::parse::<CartEnvelope>(response).await?.cart)
    }

    async fn fetch_cart(&self, session: &Session) -> Result<Vec<CartLine>, ApiError> {
        let response = self
            .client
            .get(self.url("/cart/"))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        Ok(Self::parse::<CartEnvelope>(response).await?.cart)
    }

    async fn remove_item(
        &self,
        session: &Session,
        product_id: ProductId,
    ) -> Result<Vec<CartLine>, ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/cart/{product_id}")))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        Ok(Self::parse::<CartEnvelope>(response).await?.cart)
    }
}

impl LikeApi for HttpApi {
    async fn toggle_like(
        &self,
        session: &Session,
        video_id: VideoId,
    ) -> Result<LikeState, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/likes/toggle/{video_id}")))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        Self::parse(response).await
    }
}

impl AuthApi for HttpApi {
    async fn login(&self, identifier: &str, password: &str) -> Result<Session, ApiError> {
        let response = self
            .client
            .post(self.url("/users/login"))
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await?;
        let tokens: TokenEnvelope = Self::parse(response).await?;
        Ok(Session::new(tokens.access_token, tokens.refresh_token))
    }

    async fn refresh(&self, session: &Session) -> Result<Session, ApiError> {
        let response = self
            .client
            .post(self.url("/users/refresh"))
            .json(&json!({ "refresh_token": session.refresh_token }))
            .send()
            .await?;
        let tokens: TokenEnvelope = Self::parse(response).await?;
        Ok(Session::new(tokens.access_token, tokens.refresh_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        assert!(ApiError::Status(401).is_auth_failure());
        assert!(ApiError::Status(403).is_auth_failure());
        assert!(!ApiError::Status(500).is_auth_failure());
        assert!(!ApiError::Status(404).is_auth_failure());
        assert!(!ApiError::Transport("connection refused".to_owned()).is_auth_failure());
    }
}
