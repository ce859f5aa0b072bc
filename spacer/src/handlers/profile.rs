//! Profile page and profile update.

use super::{MultipartForm, run_flow};
use crate::environment::SpacerEnvironment;
use crate::features::profile::{
    ProfileAction, ProfileForm, ProfileReducer, ProfileState, notice_text,
};
use crate::views::{Nav, ProfilePage};
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use spacer_api::models::BookingStatus;
use spacer_web::{AuthSession, WebResult, cleared_session_cookies, render};
use spacer_web::session::LOGIN_PATH;

/// `GET /profile` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    /// Booking status filter
    pub status: Option<String>,
    /// Hand-over notice key from another page
    pub notice: Option<String>,
}

fn respond(
    session: &AuthSession,
    state: &ProfileState,
    notice: Option<&str>,
    env: &SpacerEnvironment,
) -> WebResult<Response> {
    if state.session_expired {
        tracing::info!("API rejected the session token, logging out");
        let cookies = cleared_session_cookies();
        return Ok((cookies, Redirect::to(LOGIN_PATH)).into_response());
    }
    let page = ProfilePage::new(
        Nav::signed_in(session.is_admin()),
        state,
        notice,
        &env.settings,
    );
    Ok(render(&page)?.into_response())
}

/// `GET /profile`
pub async fn show(
    State(env): State<SpacerEnvironment>,
    session: AuthSession,
    Query(query): Query<ProfileQuery>,
) -> WebResult<Response> {
    let status = query.status.as_deref().and_then(BookingStatus::parse);
    let store = run_flow(
        &env,
        ProfileReducer,
        ProfileState::for_session(&session.token),
        ProfileAction::Load { status },
    )
    .await?;
    let state = store.state(Clone::clone).await;
    let notice = query.notice.as_deref().and_then(notice_text);
    respond(&session, &state, notice, &env)
}

/// `POST /profile` (multipart, avatar under `profile_picture`)
pub async fn update(
    State(env): State<SpacerEnvironment>,
    session: AuthSession,
    multipart: Multipart,
) -> WebResult<Response> {
    let mut body = MultipartForm::read(multipart).await?;
    let form = ProfileForm {
        username: body.text("username"),
        email: body.text("email"),
        picture: body.take_files("profile_picture").into_iter().next(),
    };

    let store = run_flow(
        &env,
        ProfileReducer,
        ProfileState::for_session(&session.token),
        ProfileAction::Load { status: None },
    )
    .await?;
    store
        .send_and_wait(ProfileAction::Update(form), env.settings.flow_timeout)
        .await?;
    let state = store.state(Clone::clone).await;
    respond(&session, &state, None, &env)
}
