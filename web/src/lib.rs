//! Axum integration for Spacer pages.
//!
//! Page handlers in the `spacer` crate follow one shape:
//!
//! 1. **Extract** the session from cookies ([`session`])
//! 2. **Build** a per-request `Store` and send the page action
//! 3. **Wait** for the cascade of effects to settle
//! 4. **Render** the resulting state with an askama template
//!
//! Anything that cannot be shown inline becomes an [`AppError`], which
//! renders as a blocking alert page.
//!
//! # Example
//!
//! ```ignore
//! async fn profile(
//!     State(env): State<SpacerEnvironment>,
//!     session: AuthSession,
//! ) -> WebResult<Html<String>> {
//!     let store = Store::new(ProfileState::for_session(session.token), ProfileReducer, env);
//!     store.send_and_wait(ProfileAction::Load, timeout).await?;
//!     render(&store.state(ProfilePage::from).await)
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod session;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::RequestId;
pub use middleware::{REQUEST_ID_HEADER, request_tracing};
pub use session::{AdminSession, AuthSession, Session, cleared_session_cookies, session_cookies};

use askama::Template;
use axum::response::Html;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Render a template into an HTML response.
///
/// # Errors
///
/// Returns an internal [`AppError`] if the template fails to render.
pub fn render<T: Template>(template: &T) -> WebResult<Html<String>> {
    template.render().map(Html).map_err(|err| {
        tracing::error!(error = %err, "Template render error");
        AppError::from(err)
    })
}
