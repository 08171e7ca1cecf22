//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tiffinbox_core::{CustomerId, Email};

/// A customer row (domain type).
///
/// Carries the password hash and the currently live refresh token; never
/// serialize this directly - convert to [`PublicCustomer`] first.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Display name.
    pub username: String,
    /// Login email.
    pub email: Email,
    /// Login phone number.
    pub phone_number: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// The one live refresh token, if any. Overwritten on every issue
    /// (rotation) and cleared on logout.
    pub current_refresh_token: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Customer shape safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PublicCustomer {
    pub id: CustomerId,
    pub username: String,
    pub email: Email,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Customer> for PublicCustomer {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            username: customer.username.clone(),
            email: customer.email.clone(),
            phone_number: customer.phone_number.clone(),
            created_at: customer.created_at,
        }
    }
}
