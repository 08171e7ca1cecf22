//! Client session: the credential pair, held explicitly.
//!
//! There is no ambient "current user" global; whoever needs a credential is
//! handed a [`Session`]. `None` where a `Session` is expected means an
//! unauthenticated (guest) flow.

use serde::{Deserialize, Serialize};

/// An authenticated client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer token sent on every authenticated request.
    pub access_token: String,
    /// Long-lived token redeemed (once) for a fresh pair.
    pub refresh_token: String,
}

impl Session {
    /// Create a session from a freshly issued pair.
    #[must_use]
    pub const fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}
