//! Static pages.

use crate::views::{AboutPage, HomePage, Nav};
use axum::response::Html;
use spacer_web::{Session, WebResult, render};

/// `GET /`
#[allow(clippy::unused_async)]
pub async fn home(session: Session) -> WebResult<Html<String>> {
    render(&HomePage {
        nav: Nav::from_session(&session),
    })
}

/// `GET /about`
#[allow(clippy::unused_async)]
pub async fn about(session: Session) -> WebResult<Html<String>> {
    render(&AboutPage {
        nav: Nav::from_session(&session),
    })
}
