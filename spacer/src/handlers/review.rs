//! "Leave a Review".

use super::run_flow;
use crate::environment::SpacerEnvironment;
use crate::features::review::{ReviewAction, ReviewForm, ReviewReducer, ReviewState};
use crate::views::{Nav, ReviewPage};
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use spacer_api::models::BookingId;
use spacer_runtime::Store;
use spacer_web::{AuthSession, WebResult, render};

/// Where an accepted review lands
const SUBMITTED_REDIRECT: &str = "/profile?notice=review-submitted";

type ReviewStore = Store<ReviewState, ReviewAction, SpacerEnvironment, ReviewReducer>;

async fn open(env: &SpacerEnvironment, session: &AuthSession, id: String) -> WebResult<ReviewStore> {
    run_flow(
        env,
        ReviewReducer,
        ReviewState::for_session(&session.token),
        ReviewAction::Open {
            booking_id: BookingId::new(id),
        },
    )
    .await
}

async fn page(session: &AuthSession, store: &ReviewStore) -> WebResult<Html<String>> {
    let nav = Nav::signed_in(session.is_admin());
    let page = store.state(|state| ReviewPage::new(nav, state)).await;
    render(&page)
}

/// `GET /bookings/:id/review`
pub async fn show(
    State(env): State<SpacerEnvironment>,
    session: AuthSession,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let store = open(&env, &session, id).await?;
    page(&session, &store).await
}

/// `POST /bookings/:id/review/check`: validate and re-render.
pub async fn check(
    State(env): State<SpacerEnvironment>,
    session: AuthSession,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> WebResult<Html<String>> {
    let store = open(&env, &session, id).await?;
    store
        .send_and_wait(ReviewAction::Check(form), env.settings.flow_timeout)
        .await?;
    page(&session, &store).await
}

/// `POST /bookings/:id/review`
pub async fn submit(
    State(env): State<SpacerEnvironment>,
    session: AuthSession,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> WebResult<Response> {
    let store = open(&env, &session, id).await?;
    store
        .send_and_wait(ReviewAction::Submit(form), env.settings.flow_timeout)
        .await?;

    if store.state(|state| state.submitted).await {
        return Ok(Redirect::to(SUBMITTED_REDIRECT).into_response());
    }
    Ok(page(&session, &store).await?.into_response())
}
