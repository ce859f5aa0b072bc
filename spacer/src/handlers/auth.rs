//! Login, registration and logout.

use super::run_flow;
use crate::environment::SpacerEnvironment;
use crate::features::auth::{AuthAction, AuthMode, AuthReducer, AuthState, LoginForm, RegisterForm};
use crate::views::{AuthPage, Nav};
use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use spacer_web::{Session, WebResult, cleared_session_cookies, render, session_cookies};

fn page(session: &Session, state: &AuthState) -> WebResult<Html<String>> {
    render(&AuthPage::new(Nav::from_session(session), state))
}

/// `GET /login`
#[allow(clippy::unused_async)]
pub async fn login_page(session: Session) -> WebResult<Html<String>> {
    page(&session, &AuthState::new(AuthMode::Login))
}

/// `GET /register`
#[allow(clippy::unused_async)]
pub async fn register_page(session: Session) -> WebResult<Html<String>> {
    page(&session, &AuthState::new(AuthMode::Register))
}

/// `POST /login`
///
/// A successful login stores the token and role in cookies and goes home;
/// anything else re-renders the form.
pub async fn login(
    State(env): State<SpacerEnvironment>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let store = run_flow(
        &env,
        AuthReducer,
        AuthState::new(AuthMode::Login),
        AuthAction::SubmitLogin(form),
    )
    .await?;
    let state = store.state(Clone::clone).await;

    match &state.granted {
        Some(grant) => {
            tracing::info!(role = %grant.role, "User logged in");
            let cookies = session_cookies(&grant.token, &grant.role);
            Ok((cookies, Redirect::to("/")).into_response())
        },
        None => Ok(page(&session, &state)?.into_response()),
    }
}

/// `POST /register`
pub async fn register(
    State(env): State<SpacerEnvironment>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> WebResult<Html<String>> {
    let store = run_flow(
        &env,
        AuthReducer,
        AuthState::new(AuthMode::Register),
        AuthAction::SubmitRegister(form),
    )
    .await?;
    let state = store.state(Clone::clone).await;
    page(&session, &state)
}

/// `GET /logout`: drop the session cookies and go home.
#[allow(clippy::unused_async)]
pub async fn logout() -> Response {
    (cleared_session_cookies(), Redirect::to("/")).into_response()
}
