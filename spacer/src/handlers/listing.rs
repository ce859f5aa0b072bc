//! "List Your Place".

use super::{MultipartForm, run_flow};
use crate::environment::SpacerEnvironment;
use crate::features::listing::{ListingAction, ListingForm, ListingReducer, ListingState};
use crate::views::{ListingPage, Nav};
use axum::{
    extract::{Multipart, State},
    response::Html,
};
use spacer_web::{AuthSession, WebResult, render};

/// `GET /listings/new`
#[allow(clippy::unused_async)]
pub async fn new_listing(session: AuthSession) -> WebResult<Html<String>> {
    render(&ListingPage::new(
        Nav::signed_in(session.is_admin()),
        &ListingState::for_session(&session.token),
    ))
}

/// `POST /listings` (multipart, images under `images`)
pub async fn create(
    State(env): State<SpacerEnvironment>,
    session: AuthSession,
    multipart: Multipart,
) -> WebResult<Html<String>> {
    let mut body = MultipartForm::read(multipart).await?;
    let form = ListingForm {
        name: body.text("name"),
        space_type: body.text("type"),
        description: body.text("description"),
        hourly_rate: body.text("hourly_rate"),
        day_rate: body.text("day_rate"),
        capacity: body.text("capacity"),
        location: body.text("location"),
        images: body.take_files("images"),
    };

    let store = run_flow(
        &env,
        ListingReducer,
        ListingState::for_session(&session.token),
        ListingAction::Submit(form),
    )
    .await?;
    let state = store.state(Clone::clone).await;
    render(&ListingPage::new(Nav::signed_in(session.is_admin()), &state))
}
