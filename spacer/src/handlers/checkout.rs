//! Booking submission and the payment provider's return leg.

use super::catalog::detail_page;
use super::run_flow;
use crate::environment::SpacerEnvironment;
use crate::features::booking::BookingForm;
use crate::features::checkout::{
    CheckoutAction, CheckoutPhase, CheckoutReducer, CheckoutState, MISSING_REFERENCE,
};
use crate::views::{AlertPage, BookingDialog, Nav};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use spacer_api::models::SpaceId;
use spacer_runtime::Store;
use spacer_web::{AuthSession, RequestId, WebResult, render};

/// Where a verified payment lands
const CONFIRMED_REDIRECT: &str = "/profile?notice=booking-confirmed";

/// `POST /spaces/:id/book`
///
/// Creates the booking, initializes payment and sends the browser to the
/// provider. Validation, booking and initialization failures re-render
/// the dialog, as does running out of time: the booking may exist by then,
/// so the dialog stays disabled.
pub async fn book(
    State(env): State<SpacerEnvironment>,
    RequestId(request_id): RequestId,
    session: AuthSession,
    Path(id): Path<String>,
    Form(form): Form<BookingForm>,
) -> WebResult<Response> {
    let store = Store::new(
        CheckoutState::for_session(&session.token),
        CheckoutReducer,
        env.clone(),
    );
    let submit = CheckoutAction::Submit {
        space_id: SpaceId::new(&id),
        form,
    };
    if let Err(error) = store.send_and_wait(submit, env.settings.flow_timeout).await {
        tracing::warn!(%request_id, space_id = %id, %error, "Checkout did not settle in time");
        store.send(CheckoutAction::TimedOut).await;
    }
    let state = store.state(Clone::clone).await;

    if let Some(url) = state.checkout_url() {
        tracing::info!(%request_id, space_id = %id, "Handing off to payment provider");
        return Ok(Redirect::to(url).into_response());
    }

    let can_submit = state.can_resubmit();
    let dialog = BookingDialog::new(&state.form, state.errors, state.alert, can_submit);
    let nav = Nav::signed_in(session.is_admin());
    Ok(detail_page(&env, nav, &id, dialog).await?.into_response())
}

/// First value of each parameter the return leg cares about.
///
/// The provider appends its own `reference` (and `trxref`) to the callback
/// URL, so a parameter can appear twice; the first one is ours.
fn return_params(pairs: Vec<(String, String)>) -> (Option<String>, Option<String>) {
    let mut booking_id = None;
    let mut reference = None;
    for (name, value) in pairs {
        match name.as_str() {
            "booking_id" if booking_id.is_none() => booking_id = Some(value),
            "reference" if reference.is_none() => reference = Some(value),
            _ => {},
        }
    }
    (booking_id, reference)
}

/// `GET /checkout/return`: verify the payment the provider reports.
pub async fn payment_return(
    State(env): State<SpacerEnvironment>,
    RequestId(request_id): RequestId,
    session: AuthSession,
    Query(pairs): Query<Vec<(String, String)>>,
) -> WebResult<Response> {
    let (booking_id, reference) = return_params(pairs);
    tracing::info!(
        %request_id,
        booking_id = booking_id.as_deref().unwrap_or("-"),
        "Payment provider returned"
    );
    let store = run_flow(
        &env,
        CheckoutReducer,
        CheckoutState::for_session(&session.token),
        CheckoutAction::Returned {
            booking_id,
            reference,
        },
    )
    .await?;
    let state = store.state(Clone::clone).await;

    let message = match state.phase {
        CheckoutPhase::Verified { .. } => {
            return Ok(Redirect::to(CONFIRMED_REDIRECT).into_response());
        },
        CheckoutPhase::VerificationFailed { message, .. } => message,
        _ => state
            .alert
            .unwrap_or_else(|| MISSING_REFERENCE.to_string()),
    };

    let page = AlertPage {
        nav: Nav::signed_in(session.is_admin()),
        title: "Payment not confirmed".to_string(),
        message,
    };
    Ok(render(&page)?.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_return_params_take_the_first_reference() {
        let (booking_id, reference) = return_params(pairs(&[
            ("reference", "spacer-b-1-1"),
            ("booking_id", "b-1"),
            ("trxref", "spacer-b-1-1"),
            ("reference", "other"),
        ]));
        assert_eq!(booking_id.as_deref(), Some("b-1"));
        assert_eq!(reference.as_deref(), Some("spacer-b-1-1"));
    }

    #[test]
    fn test_return_params_missing() {
        assert_eq!(return_params(Vec::new()), (None, None));
        assert_eq!(return_params(pairs(&[("trxref", "x")])), (None, None));
    }
}
