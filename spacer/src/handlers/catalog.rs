//! Catalog, space detail and the booking dialog check.

use super::run_flow;
use crate::environment::SpacerEnvironment;
use crate::features::booking::{
    BookingDialogAction, BookingDialogReducer, BookingDialogState, BookingForm,
};
use crate::features::catalog::{
    CatalogAction, CatalogFilters, CatalogQuery, CatalogReducer, CatalogState,
    SpaceDetailAction, SpaceDetailReducer, SpaceDetailState,
};
use crate::views::{BookingDialog, CatalogPage, Nav, SpaceDetailPage};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Html,
};
use spacer_api::ApiError;
use spacer_api::models::{SpaceDetail, SpaceId};
use spacer_web::{AppError, AuthSession, Session, WebResult, render};

/// `GET /spaces`
pub async fn list(
    State(env): State<SpacerEnvironment>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> WebResult<Html<String>> {
    let filters = CatalogFilters::from(query);
    let store = run_flow(
        &env,
        CatalogReducer,
        CatalogState::default(),
        CatalogAction::Load(filters),
    )
    .await?;
    let state = store.state(Clone::clone).await;
    render(&CatalogPage::new(
        Nav::from_session(&session),
        &state,
        &env.settings,
    ))
}

/// Fetch a space for the detail page.
///
/// # Errors
///
/// Unknown spaces become a 404 page; other failures map through
/// [`AppError::from`].
pub(crate) async fn load_space(env: &SpacerEnvironment, id: &str) -> WebResult<SpaceDetail> {
    let store = run_flow(
        env,
        SpaceDetailReducer,
        SpaceDetailState::default(),
        SpaceDetailAction::Load(SpaceId::new(id)),
    )
    .await?;
    let state = store.state(Clone::clone).await;

    match (state.detail, state.error) {
        (Some(detail), _) => Ok(detail),
        (None, Some(ApiError::Rejected { status: 404, .. }) | None) => {
            Err(AppError::not_found("Space", id))
        },
        (None, Some(error)) => Err(AppError::from(error)),
    }
}

/// Render the detail page around a dialog.
pub(crate) async fn detail_page(
    env: &SpacerEnvironment,
    nav: Nav,
    id: &str,
    dialog: BookingDialog,
) -> WebResult<Html<String>> {
    let detail = load_space(env, id).await?;
    render(&SpaceDetailPage::new(nav, &detail, dialog, &env.settings))
}

/// `GET /spaces/:id`
pub async fn detail(
    State(env): State<SpacerEnvironment>,
    session: Session,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    detail_page(&env, Nav::from_session(&session), &id, BookingDialog::default()).await
}

/// `POST /spaces/:id/check`: validate the dialog and re-render it.
pub async fn check_dates(
    State(env): State<SpacerEnvironment>,
    session: AuthSession,
    Path(id): Path<String>,
    Form(form): Form<BookingForm>,
) -> WebResult<Html<String>> {
    let store = run_flow(
        &env,
        BookingDialogReducer,
        BookingDialogState::default(),
        BookingDialogAction::Check(form),
    )
    .await?;
    let dialog = store
        .state(|s| BookingDialog::new(&s.form, s.errors.clone(), None, s.can_submit))
        .await;
    detail_page(&env, Nav::signed_in(session.is_admin()), &id, dialog).await
}
