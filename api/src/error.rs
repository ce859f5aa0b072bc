//! Error types for the Spacer API and payment clients.

use thiserror::Error;

/// Errors returned by [`SpacerApi`](crate::SpacerApi) and
/// [`PaymentGateway`](crate::PaymentGateway) implementations.
///
/// Only two categories matter to the pages: the server answered with a
/// not-OK status (and usually a `message`), or the call never completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure (connection refused, DNS, TLS, timeout)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    ResponseParseFailed(String),

    /// 401 from the API (missing or expired token)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403 from the API
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Any other not-OK status
    #[error("API error {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Server-provided message
        message: String,
    },

    /// The payment provider declined to initialize a transaction
    #[error("Payment gateway error: {0}")]
    Gateway(String),
}

impl ApiError {
    /// Text suitable for an inline alert.
    ///
    /// Server-provided messages are shown as-is; transport and parse
    /// failures get a generic sentence.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Gateway(message)
            | Self::Rejected { message, .. } => message.clone(),
            Self::RequestFailed(_) | Self::ResponseParseFailed(_) => {
                "Unable to reach the server. Please try again later.".to_string()
            },
        }
    }

    /// The message the server sent, if the server answered at all.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Gateway(message)
            | Self::Rejected { message, .. } => Some(message),
            Self::RequestFailed(_) | Self::ResponseParseFailed(_) => None,
        }
    }

    /// HTTP status the server answered with, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::Rejected { status, .. } => Some(*status),
            Self::RequestFailed(_) | Self::ResponseParseFailed(_) | Self::Gateway(_) => None,
        }
    }
}
