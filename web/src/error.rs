//! Error types for web handlers.
//!
//! This module bridges API, runtime and template errors to HTTP responses.
//! Errors render as a blocking alert page; inline alerts are part of each
//! page's own state and never reach this type.

use askama::Template;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use spacer_api::ApiError;
use spacer_runtime::StoreError;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(session: AuthSession) -> Result<Html<String>, AppError> {
///     let profile = api.get_profile(&session.token).await?;
///     Ok(render(ProfilePage::new(profile))?)
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for logs)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "FORBIDDEN")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} {id} was not found"),
            "NOT_FOUND",
        )
    }

    /// Create a 504 Gateway Timeout error (a page flow did not settle).
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message.into(), "TIMEOUT")
    }

    /// Create a 502 Bad Gateway error (the API could not be reached).
    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message.into(), "BAD_GATEWAY")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Blocking alert page.
#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage<'a> {
    status: u16,
    reason: &'a str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Request failed"
                );
            }
        }

        let page = ErrorPage {
            status: self.status.as_u16(),
            reason: self.status.canonical_reason().unwrap_or("Error"),
            message: &self.message,
        };

        match page.render() {
            Ok(body) => (self.status, Html(body)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to render error page");
                (self.status, self.message).into_response()
            },
        }
    }
}

/// API failures keep the server's status class and message.
impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        let message = err.user_message();
        let app_error = match &err {
            ApiError::Unauthorized(_) => Self::unauthorized(message),
            ApiError::Forbidden(_) => Self::forbidden(message),
            ApiError::Rejected { status: 404, .. } => {
                Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
            },
            ApiError::Rejected { status, .. } if *status < 500 => Self::bad_request(message),
            ApiError::Rejected { .. }
            | ApiError::RequestFailed(_)
            | ApiError::ResponseParseFailed(_)
            | ApiError::Gateway(_) => Self::bad_gateway(message),
        };
        app_error.with_source(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::timeout("The server took too long to respond. Please try again.").with_source(err)
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        Self::internal("Failed to render page").with_source(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(format!("Invalid form upload: {}", err.body_text()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Space", "s-1");
        assert_eq!(err.to_string(), "[NOT_FOUND] Space s-1 was not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_rejection_keeps_server_message() {
        let err = AppError::from(ApiError::Rejected {
            status: 400,
            message: "Space is not available".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Space is not available");
    }

    #[test]
    fn test_transport_failure_is_bad_gateway() {
        let err = AppError::from(ApiError::RequestFailed("refused".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_store_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(StoreError::Timeout(Duration::from_secs(1)));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.code, "TIMEOUT");
    }

    #[test]
    fn test_template_failure_is_internal() {
        let err = AppError::from(askama::Error::Fmt(fmt::Error));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.source.is_some());
    }

    #[tokio::test]
    async fn test_error_renders_escaped_alert_page() {
        let response = AppError::forbidden("<b>Admin privileges required</b>").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("&lt;b&gt;Admin privileges required&lt;/b&gt;"));
        assert!(html.contains("403"));
    }
}
