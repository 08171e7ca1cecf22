//! Bearer-token extractors.
//!
//! The access token rides either the `Authorization` header or the
//! `accessToken` cookie; the header wins when both are present. Extractors
//! resolve the token to a [`Principal`] once per request and hand it to the
//! handler, so handlers never touch raw tokens.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::error::AppError;
use crate::models::{Customer, Owner, Principal};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Cookie carrying the access token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie carrying the refresh token for browser clients.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Pull the bearer token out of a request.
///
/// Checks the `Authorization: Bearer` header first, then falls back to the
/// `accessToken` cookie.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION)
        && let Ok(value) = value.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
        && !token.is_empty()
    {
        return Some(token.to_owned());
    }
    cookie_value(headers, ACCESS_TOKEN_COOKIE)
}

/// Read a single cookie out of the `Cookie` header(s).
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            let Some((key, val)) = pair.split_once('=') else {
                continue;
            };
            if key.trim() == name && !val.is_empty() {
                return Some(val.to_owned());
            }
        }
    }
    None
}

/// Extractor that requires a valid access token of either kind.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(principal): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("hello, {:?}", principal.kind())
/// }
/// ```
pub struct RequireAuth(pub Principal);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;
        let principal = state.auth().resolve(&token).await?;
        Ok(Self(principal))
    }
}

/// Extractor that requires an authenticated customer.
///
/// An owner presenting a valid token gets `403`, not `401`: the credential
/// is fine, the kind is wrong.
pub struct RequireCustomer(pub Customer);

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(principal) = RequireAuth::from_request_parts(parts, state).await?;
        match principal {
            Principal::Customer(customer) => Ok(Self(customer)),
            Principal::Owner(_) => Err(AuthError::WrongKind {
                required: tiffinbox_core::PrincipalKind::Customer,
            }
            .into()),
        }
    }
}

/// Extractor that requires an authenticated owner.
pub struct RequireOwner(pub Owner);

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(principal) = RequireAuth::from_request_parts(parts, state).await?;
        match principal {
            Principal::Owner(owner) => Ok(Self(owner)),
            Principal::Customer(_) => Err(AuthError::WrongKind {
                required: tiffinbox_core::PrincipalKind::Owner,
            }
            .into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_from_authorization_header() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_falls_back_to_cookie() {
        let map = headers(&[(header::COOKIE, "theme=dark; accessToken=tok123")]);
        assert_eq!(bearer_token(&map).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "accessToken=from-cookie"),
        ]);
        assert_eq!(bearer_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_malformed_authorization_ignored() {
        let map = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "accessToken=tok123"),
        ]);
        assert_eq!(bearer_token(&map).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_no_token_anywhere() {
        let map = headers(&[(header::COOKIE, "theme=dark")]);
        assert_eq!(bearer_token(&map), None);
    }

    #[test]
    fn test_cookie_value_picks_named_cookie() {
        let map = headers(&[(header::COOKIE, "refreshToken=r1; accessToken=a1")]);
        assert_eq!(cookie_value(&map, "refreshToken").as_deref(), Some("r1"));
        assert_eq!(cookie_value(&map, "accessToken").as_deref(), Some("a1"));
        assert_eq!(cookie_value(&map, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_value_is_none() {
        let map = headers(&[(header::COOKIE, "accessToken=")]);
        assert_eq!(cookie_value(&map, "accessToken"), None);
    }
}
