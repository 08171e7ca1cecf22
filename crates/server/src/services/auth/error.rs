//! Authentication error types.

use thiserror::Error;

use tiffinbox_core::PrincipalKind;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tiffinbox_core::EmailError),

    /// Wrong password or no such account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Malformed, forged, or expired token.
    #[error("invalid or expired token")]
    InvalidToken,

    /// A refresh token that was already redeemed (or superseded by rotation)
    /// was presented again. The only recovery is a full re-login.
    #[error("refresh token is stale or already used")]
    TokenReuse,

    /// Token verified but its subject exists in neither namespace.
    #[error("token subject does not exist")]
    UnknownPrincipal,

    /// The principal resolved to the other kind than this route requires.
    #[error("route requires a {required} principal")]
    WrongKind {
        /// The kind the route is restricted to.
        required: PrincipalKind,
    },

    /// Owner registration attempted with a non-allow-listed email.
    #[error("email is not allow-listed for owner registration")]
    NotAllowListed,

    /// Account already exists.
    #[error("account already exists")]
    AlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing failed (claim serialization bug).
    #[error("token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
