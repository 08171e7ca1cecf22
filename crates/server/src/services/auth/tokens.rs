//! JWT signing and verification.
//!
//! Two HS256 key pairs: one for short-lived access tokens, one for
//! long-lived refresh tokens. A `kind` claim prevents a refresh token from
//! passing as an access token even if the secrets were ever unified.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenConfig;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_DAY: i64 = 86_400;

/// Which credential a token is.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in every token.
///
/// Deliberately minimal: the subject id and lifetimes. No principal-kind
/// discriminator travels in the token - the resolver discovers the kind by
/// probing both namespaces.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id (customer or owner).
    pub sub: Uuid,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Access vs refresh.
    pub kind: TokenKind,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Prepared signing/verification keys.
///
/// Built once at startup from [`TokenConfig`]; key misconfiguration is a
/// startup failure, so signing at runtime only fails on serialization bugs.
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenKeys {
    /// Build keys from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let access = config.access_secret.expose_secret().as_bytes();
        let refresh = config.refresh_secret.expose_secret().as_bytes();
        #[allow(clippy::cast_possible_wrap)]
        Self {
            access_encoding: EncodingKey::from_secret(access),
            access_decoding: DecodingKey::from_secret(access),
            refresh_encoding: EncodingKey::from_secret(refresh),
            refresh_decoding: DecodingKey::from_secret(refresh),
            access_ttl_seconds: config.access_ttl_minutes as i64 * SECONDS_PER_MINUTE,
            refresh_ttl_seconds: config.refresh_ttl_days as i64 * SECONDS_PER_DAY,
        }
    }

    fn sign(
        &self,
        subject: Uuid,
        kind: TokenKind,
        ttl_seconds: i64,
        key: &EncodingKey,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: subject,
            iat: now,
            exp: now + ttl_seconds,
            kind,
        };
        let token = encode(&Header::default(), &claims, key)?;
        tracing::debug!(subject = %subject, kind = ?kind, "token signed");
        Ok(token)
    }

    /// Sign a short-lived access token. Never persisted anywhere.
    ///
    /// # Errors
    ///
    /// Returns an error only if claim serialization fails.
    pub fn sign_access(&self, subject: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        self.sign(
            subject,
            TokenKind::Access,
            self.access_ttl_seconds,
            &self.access_encoding,
        )
    }

    /// Sign a long-lived refresh token. The caller persists it on the
    /// principal row; that stored copy is what makes redemption exactly-once.
    ///
    /// # Errors
    ///
    /// Returns an error only if claim serialization fails.
    pub fn sign_refresh(&self, subject: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        self.sign(
            subject,
            TokenKind::Refresh,
            self.refresh_ttl_seconds,
            &self.refresh_encoding,
        )
    }

    fn verify(
        &self,
        token: &str,
        expected: TokenKind,
        key: &DecodingKey,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::default();
        let data = decode::<Claims>(token, key, &validation)?;
        if data.claims.kind != expected {
            return Err(jsonwebtoken::errors::ErrorKind::InvalidToken.into());
        }
        Ok(data.claims)
    }

    /// Verify an access token's signature, expiry, and kind.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed, forged, expired, or refresh-kind
    /// token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.verify(token, TokenKind::Access, &self.access_decoding)
    }

    /// Verify a refresh token's signature, expiry, and kind.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed, forged, expired, or access-kind
    /// token.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        self.verify(token, TokenKind::Refresh, &self.refresh_decoding)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn make_keys() -> TokenKeys {
        TokenKeys::new(&TokenConfig {
            access_secret: SecretString::from("access-test-key-material-0123456789"),
            refresh_secret: SecretString::from("refresh-test-key-material-0123456789"),
            access_ttl_minutes: 15,
            refresh_ttl_days: 10,
        })
    }

    #[test]
    fn test_sign_and_verify_access() {
        let keys = make_keys();
        let subject = Uuid::new_v4();
        let token = keys.sign_access(subject).unwrap();
        let claims = keys.verify_access(&token).unwrap();
        assert_eq!(claims.sub, subject);
        assert_eq!(claims.kind, TokenKind::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_sign_and_verify_refresh() {
        let keys = make_keys();
        let subject = Uuid::new_v4();
        let token = keys.sign_refresh(subject).unwrap();
        let claims = keys.verify_refresh(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let keys = make_keys();
        let token = keys.sign_access(Uuid::new_v4()).unwrap();
        assert!(keys.verify_refresh(&token).is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let keys = make_keys();
        let token = keys.sign_refresh(Uuid::new_v4()).unwrap();
        assert!(keys.verify_access(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keys = make_keys();
        let mut token = keys.sign_access(Uuid::new_v4()).unwrap();
        token.push('x');
        assert!(keys.verify_access(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = make_keys();
        let other = TokenKeys::new(&TokenConfig {
            access_secret: SecretString::from("a-different-key-material-0123456789"),
            refresh_secret: SecretString::from("b-different-key-material-0123456789"),
            access_ttl_minutes: 15,
            refresh_ttl_days: 10,
        });
        let token = keys.sign_access(Uuid::new_v4()).unwrap();
        assert!(other.verify_access(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = TokenConfig {
            access_secret: SecretString::from("access-test-key-material-0123456789"),
            refresh_secret: SecretString::from("refresh-test-key-material-0123456789"),
            access_ttl_minutes: 15,
            refresh_ttl_days: 10,
        };
        let keys = TokenKeys::new(&config);
        // Sign a token that expired well past the default validation leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.access_secret.expose_secret().as_bytes()),
        )
        .unwrap();
        assert!(keys.verify_access(&token).is_err());
    }
}
