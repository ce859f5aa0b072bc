//! Back-office: spaces, users and bookings.
//!
//! Every route requires [`AdminSession`]. Mutations load the affected tab
//! first so the form and the refreshed listing render together.

use super::run_flow;
use crate::environment::SpacerEnvironment;
use crate::features::admin::{
    AdminAction, AdminReducer, AdminSpaceForm, AdminState, AdminTab, AdminUserForm,
    BookingFilterForm,
};
use crate::views::{AdminPage, Nav};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use spacer_api::models::{BookingId, SpaceId, UserId};
use spacer_runtime::Store;
use spacer_web::{AdminSession, WebResult, render};

type AdminStore = Store<AdminState, AdminAction, SpacerEnvironment, AdminReducer>;

/// `GET /admin` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminQuery {
    /// `spaces`, `users` or `bookings`
    pub tab: Option<String>,
    /// Row to prefill the form with
    pub edit: Option<String>,
    /// Booking whose details to open (bookings tab)
    pub view: Option<String>,
    /// Bookings filter: status wire value
    pub status: String,
    /// Bookings filter: lower bound
    pub start_date: String,
    /// Bookings filter: upper bound
    pub end_date: String,
}

async fn load(
    env: &SpacerEnvironment,
    session: &AdminSession,
    tab: AdminTab,
    filter: BookingFilterForm,
) -> WebResult<AdminStore> {
    run_flow(
        env,
        AdminReducer,
        AdminState::for_session(&session.token),
        AdminAction::Load { tab, filter },
    )
    .await
}

/// Send a follow-up action and render the back-office.
async fn then_render(
    env: &SpacerEnvironment,
    store: AdminStore,
    action: Option<AdminAction>,
) -> WebResult<Html<String>> {
    if let Some(action) = action {
        store
            .send_and_wait(action, env.settings.flow_timeout)
            .await?;
    }
    let page = store
        .state(|state| AdminPage::new(Nav::signed_in(true), state))
        .await;
    render(&page)
}

/// `GET /admin`
pub async fn dashboard(
    State(env): State<SpacerEnvironment>,
    session: AdminSession,
    Query(query): Query<AdminQuery>,
) -> WebResult<Html<String>> {
    let tab = AdminTab::parse(query.tab.as_deref());
    let filter = BookingFilterForm {
        status: query.status,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let store = load(&env, &session, tab, filter).await?;
    let follow_up = match tab {
        AdminTab::Spaces => query.edit.map(|id| AdminAction::EditSpace(SpaceId::new(id))),
        AdminTab::Users => query.edit.map(|id| AdminAction::EditUser(UserId::new(id))),
        AdminTab::Bookings => query.view.map(|id| AdminAction::ViewBooking(BookingId::new(id))),
    };
    then_render(&env, store, follow_up).await
}

/// `POST /admin/spaces`
pub async fn create_space(
    State(env): State<SpacerEnvironment>,
    session: AdminSession,
    Form(form): Form<AdminSpaceForm>,
) -> WebResult<Html<String>> {
    let store = load(&env, &session, AdminTab::Spaces, BookingFilterForm::default()).await?;
    let action = AdminAction::SaveSpace {
        space_id: None,
        form,
    };
    then_render(&env, store, Some(action)).await
}

/// `POST /admin/spaces/:id`
pub async fn update_space(
    State(env): State<SpacerEnvironment>,
    session: AdminSession,
    Path(id): Path<String>,
    Form(form): Form<AdminSpaceForm>,
) -> WebResult<Html<String>> {
    let store = load(&env, &session, AdminTab::Spaces, BookingFilterForm::default()).await?;
    let action = AdminAction::SaveSpace {
        space_id: Some(SpaceId::new(id)),
        form,
    };
    then_render(&env, store, Some(action)).await
}

/// `POST /admin/spaces/:id/delete`
pub async fn delete_space(
    State(env): State<SpacerEnvironment>,
    session: AdminSession,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let store = load(&env, &session, AdminTab::Spaces, BookingFilterForm::default()).await?;
    then_render(&env, store, Some(AdminAction::DeleteSpace(SpaceId::new(id)))).await
}

/// `POST /admin/users`
pub async fn create_user(
    State(env): State<SpacerEnvironment>,
    session: AdminSession,
    Form(form): Form<AdminUserForm>,
) -> WebResult<Html<String>> {
    let store = load(&env, &session, AdminTab::Users, BookingFilterForm::default()).await?;
    let action = AdminAction::SaveUser { user_id: None, form };
    then_render(&env, store, Some(action)).await
}

/// `POST /admin/users/:id`
pub async fn update_user(
    State(env): State<SpacerEnvironment>,
    session: AdminSession,
    Path(id): Path<String>,
    Form(form): Form<AdminUserForm>,
) -> WebResult<Html<String>> {
    let store = load(&env, &session, AdminTab::Users, BookingFilterForm::default()).await?;
    let action = AdminAction::SaveUser {
        user_id: Some(UserId::new(id)),
        form,
    };
    then_render(&env, store, Some(action)).await
}

/// `POST /admin/users/:id/delete`
pub async fn delete_user(
    State(env): State<SpacerEnvironment>,
    session: AdminSession,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let store = load(&env, &session, AdminTab::Users, BookingFilterForm::default()).await?;
    then_render(&env, store, Some(AdminAction::DeleteUser(UserId::new(id)))).await
}
