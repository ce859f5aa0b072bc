//! Custom Axum extractors.
//!
//! Session extractors live in [`crate::session`]; this module holds the
//! request-scoped ones that do not depend on cookies.

use crate::middleware::REQUEST_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Request id assigned by [`crate::middleware::request_tracing`].
///
/// Falls back to `"unknown"` when the middleware is not installed.
///
/// # Example
///
/// ```ignore
/// async fn handler(RequestId(request_id): RequestId) -> String {
///     tracing::info!(%request_id, "Rendering page");
///     request_id
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self(request_id))
    }
}
