//! Cookie-backed session.
//!
//! The browser keeps exactly two values: the opaque API token and the
//! user's role label. Nothing else about the user is stored client-side;
//! pages that need more ask the API.
//!
//! # Extractors
//!
//! - [`Session`]: whatever the cookies say, never rejects
//! - [`AuthSession`]: requires a token, otherwise redirects to `/login`
//! - [`AdminSession`]: requires a token and the admin role; anonymous
//!   visitors are redirected to `/login`, other users get a 403 page

use crate::error::AppError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;

/// Cookie holding the API token.
pub const TOKEN_COOKIE: &str = "authToken";

/// Cookie holding the role label.
pub const ROLE_COOKIE: &str = "userType";

/// Role label that unlocks the admin back-office.
pub const ADMIN_ROLE: &str = "admin";

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Token lifetime on the API side.
const MAX_AGE: Duration = Duration::hours(24);

/// The session as read from request cookies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    role: Option<String>,
}

impl Session {
    /// Read the session cookies from a jar. Empty values count as absent.
    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Self {
        let value = |name: &str| {
            jar.get(name)
                .map(|cookie| cookie.value().trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            token: value(TOKEN_COOKIE),
            role: value(ROLE_COOKIE),
        }
    }

    /// Read the session cookies from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_jar(&CookieJar::from_headers(headers))
    }

    /// API token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Role label, if logged in.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role.as_deref().is_some_and(is_admin_role)
    }
}

/// Whether a role label names the admin role.
#[must_use]
pub fn is_admin_role(role: &str) -> bool {
    role.trim().eq_ignore_ascii_case(ADMIN_ROLE)
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// A logged in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// API token
    pub token: String,
    /// Role label (may be empty)
    pub role: String,
}

impl AuthSession {
    /// Whether the user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_headers(&parts.headers);
        match session.token {
            Some(token) => Ok(Self {
                token,
                role: session.role.unwrap_or_default(),
            }),
            None => {
                tracing::debug!(path = %parts.uri.path(), "Anonymous visitor sent to login");
                Err(Redirect::to(LOGIN_PATH))
            },
        }
    }
}

/// A logged in admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    /// API token
    pub token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_headers(&parts.headers);
        if session.is_admin() {
            if let Some(token) = session.token {
                return Ok(Self { token });
            }
        }

        if session.is_authenticated() {
            tracing::warn!(
                path = %parts.uri.path(),
                role = session.role().unwrap_or_default(),
                "Non-admin user denied admin route"
            );
            Err(AppError::forbidden("Admin privileges required").into_response())
        } else {
            Err(Redirect::to(LOGIN_PATH).into_response())
        }
    }
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(MAX_AGE)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new());
    cookie.make_removal();
    cookie
}

/// A jar whose delta stores a fresh session.
#[must_use]
pub fn session_cookies(token: &str, role: &str) -> CookieJar {
    CookieJar::new()
        .add(session_cookie(TOKEN_COOKIE, token.to_string()))
        .add(session_cookie(ROLE_COOKIE, role.to_string()))
}

/// A jar whose delta removes the session.
#[must_use]
pub fn cleared_session_cookies() -> CookieJar {
    CookieJar::new()
        .add(removal_cookie(TOKEN_COOKIE))
        .add(removal_cookie(ROLE_COOKIE))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{
        HeaderValue,
        header::{COOKIE, SET_COOKIE},
    };

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    fn set_cookies(jar: CookieJar) -> Vec<String> {
        let response = (jar, "").into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_reads_token_and_role() {
        let session = Session::from_headers(&headers("theme=dark; authToken=abc.def; userType=Admin"));
        assert_eq!(session.token(), Some("abc.def"));
        assert!(session.is_admin());
    }

    #[test]
    fn test_role_without_token_is_not_admin() {
        let session = Session::from_headers(&headers("userType=admin"));
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_cleared_cookie_counts_as_logged_out() {
        let session = Session::from_headers(&headers("authToken=; userType="));
        assert_eq!(session, Session::default());
    }

    #[test]
    fn test_encoded_role_is_decoded() {
        let session = Session::from_headers(&headers("authToken=t; userType=space%20owner"));
        assert_eq!(session.role(), Some("space owner"));
    }

    #[test]
    fn test_session_cookies_are_scoped_and_http_only() {
        let cookies = set_cookies(session_cookies("abc", "user"));
        assert_eq!(cookies.len(), 2);

        let token = cookies.iter().find(|c| c.starts_with("authToken=abc")).unwrap();
        assert!(token.contains("HttpOnly"));
        assert!(token.contains("SameSite=Lax"));
        assert!(token.contains("Path=/"));
        assert!(token.contains("Max-Age=86400"));
        assert!(cookies.iter().any(|c| c.starts_with("userType=user")));
    }

    #[test]
    fn test_cleared_cookies_expire_both_values() {
        let cookies = set_cookies(cleared_session_cookies());
        assert_eq!(cookies.len(), 2);
        for cookie in &cookies {
            assert!(cookie.contains("Max-Age=0"), "{cookie}");
        }
        assert!(cookies.iter().any(|c| c.starts_with("authToken=;")));
        assert!(cookies.iter().any(|c| c.starts_with("userType=;")));
    }
}
