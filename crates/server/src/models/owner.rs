//! Owner domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tiffinbox_core::{Email, OwnerId};

/// An owner row (domain type).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Owner {
    /// Unique owner ID.
    pub id: OwnerId,
    /// Display name.
    pub name: String,
    /// Login email. Registration is gated to a single allow-listed address.
    pub email: Email,
    /// Argon2id password hash.
    pub password_hash: String,
    /// The one live refresh token, if any.
    pub current_refresh_token: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Owner shape safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PublicOwner {
    pub id: OwnerId,
    pub name: String,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl From<&Owner> for PublicOwner {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.id,
            name: owner.name.clone(),
            email: owner.email.clone(),
            created_at: owner.created_at,
        }
    }
}
