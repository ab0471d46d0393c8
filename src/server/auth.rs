//! Session gate for protected routes.
//!
//! The session token travels in the `token` cookie. [`require_session`]
//! verifies it and stores the caller's identity as an [`AuthUser`] request
//! extension; [`ensure_owner`] then compares that identity with the account a
//! handler was asked about.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::error::ApiError;
use super::AppState;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated user info, added to request extensions after auth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

/// Attributes for the session cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    /// Cross-site deployment: `Secure; SameSite=None` instead of `SameSite=Strict`.
    pub production: bool,
}

impl CookiePolicy {
    pub fn new(production: bool) -> Self {
        Self { production }
    }

    fn attributes(&self) -> &'static str {
        if self.production {
            "HttpOnly; Secure; SameSite=None; Path=/"
        } else {
            "HttpOnly; SameSite=Strict; Path=/"
        }
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    pub fn session_cookie(&self, token: &str) -> String {
        format!("{}={}; {}", TOKEN_COOKIE, token, self.attributes())
    }

    /// `Set-Cookie` value that makes the client drop its token.
    pub fn cleared_cookie(&self) -> String {
        format!("{}=; Max-Age=0; {}", TOKEN_COOKIE, self.attributes())
    }
}

/// Returns the value of cookie `name`, looking through every `Cookie` header.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Authentication middleware
///
/// A missing or empty cookie and a token that fails verification are
/// reported with different messages, both as 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = read_cookie(request.headers(), TOKEN_COOKIE)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthenticated("not authorized"))?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        ApiError::Unauthenticated("unauthorized access")
    })?;

    request.extensions_mut().insert(AuthUser {
        email: claims.email,
    });
    Ok(next.run(request).await)
}

/// Allows the request only when `supplied` names the authenticated user.
pub fn ensure_owner(user: &AuthUser, supplied: Option<&str>) -> Result<(), ApiError> {
    match supplied {
        Some(email) if email == user.email => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}
