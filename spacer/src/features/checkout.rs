//! Booking submission, payment hand-off and payment verification.
//!
//! ```text
//! Idle ─Submit─▶ BookingCreated ─PaymentReady─▶ PaymentRedirected ─┬─▶ Verified
//!                                                                  └─▶ VerificationFailed
//! ```
//!
//! The phase only ever moves forward. Any action that does not apply to
//! the current phase is ignored (logged at debug level). The hand-off is a
//! full-page redirect, so the return leg runs in a fresh store that enters
//! `PaymentRedirected` from whatever the provider round-tripped.

use super::booking::BookingForm;
use crate::environment::SpacerEnvironment;
use spacer_api::ApiError;
use spacer_api::models::{BookingId, CreatedBooking, NewBooking, PaymentId, SpaceId};
use spacer_api::{Checkout, PaymentInit};
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Shown when the provider redirect lacks its query parameters
pub const MISSING_REFERENCE: &str = "Missing payment reference.";

/// Shown when the page gave up while `POST /bookings` was still running
pub const BOOKING_PENDING: &str = "Booking is taking longer than expected and may already \
     have been created. Check your profile before booking again.";

/// Shown when the page gave up after the booking existed but before checkout
pub const PAYMENT_PENDING: &str = "Your booking was created, but payment could not be \
     started in time. Check your profile before booking again.";

/// Where the client is in the booking/payment sequence.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CheckoutPhase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// The API accepted the booking; payment not yet initialized
    BookingCreated {
        /// New booking
        booking_id: BookingId,
        /// Price computed by the API
        total_amount: f64,
    },
    /// The user is (or was) on the provider's checkout page
    PaymentRedirected {
        /// Booking being paid
        booking_id: BookingId,
        /// Payment reference
        reference: String,
        /// Hosted checkout page; unknown after the provider round trip
        checkout_url: Option<String>,
    },
    /// The API confirmed the payment
    Verified {
        /// Paid booking
        booking_id: BookingId,
        /// Recorded payment
        payment_id: PaymentId,
    },
    /// The API refused the payment
    VerificationFailed {
        /// Booking that stays unpaid
        booking_id: BookingId,
        /// Alert text
        message: String,
    },
}

impl CheckoutPhase {
    /// Phase name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BookingCreated { .. } => "booking_created",
            Self::PaymentRedirected { .. } => "payment_redirected",
            Self::Verified { .. } => "verified",
            Self::VerificationFailed { .. } => "verification_failed",
        }
    }
}

/// Checkout flow state.
#[derive(Clone, Debug, Default)]
pub struct CheckoutState {
    /// Bearer token of the logged in user
    pub token: String,
    /// Current phase
    pub phase: CheckoutPhase,
    /// Dialog values, echoed back when the dialog re-renders
    pub form: BookingForm,
    /// Dialog validation errors
    pub errors: Vec<String>,
    /// Inline alert (booking or payment initialization failure)
    pub alert: Option<String>,
    /// A verification call is in flight or done
    pub verification_started: bool,
    /// The page stopped waiting before the flow settled
    pub timed_out: bool,
}

impl CheckoutState {
    /// Fresh flow for the given session
    #[must_use]
    pub fn for_session(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Checkout page to send the browser to, once known
    #[must_use]
    pub fn checkout_url(&self) -> Option<&str> {
        match &self.phase {
            CheckoutPhase::PaymentRedirected {
                checkout_url: Some(url),
                ..
            } => Some(url),
            _ => None,
        }
    }

    /// Whether the re-rendered dialog may be submitted again
    #[must_use]
    pub fn can_resubmit(&self) -> bool {
        self.errors.is_empty() && self.phase == CheckoutPhase::Idle && !self.timed_out
    }
}

/// Checkout actions.
#[derive(Clone, Debug)]
pub enum CheckoutAction {
    /// User submitted the booking dialog
    Submit {
        /// Space to book
        space_id: SpaceId,
        /// Dialog values
        form: BookingForm,
    },
    /// `POST /bookings` succeeded
    BookingCreated(CreatedBooking),
    /// `POST /bookings` failed
    BookingFailed(ApiError),
    /// The provider returned a checkout page
    PaymentReady(Checkout),
    /// Profile lookup or payment initialization failed
    PaymentFailed(ApiError),
    /// The browser came back from the provider
    Returned {
        /// `booking_id` query parameter
        booking_id: Option<String>,
        /// `reference` query parameter
        reference: Option<String>,
    },
    /// `POST /bookings/{id}/verify` succeeded
    Verified(PaymentId),
    /// `POST /bookings/{id}/verify` failed
    VerificationFailed(ApiError),
    /// The request stopped waiting for the flow
    TimedOut,
}

/// Reducer for the checkout flow
#[derive(Clone, Debug, Default)]
pub struct CheckoutReducer;

impl CheckoutReducer {
    /// Payment reference: `spacer-{booking_id}-{unix_millis}`
    #[must_use]
    pub fn reference(booking_id: &BookingId, env: &SpacerEnvironment) -> String {
        format!("spacer-{booking_id}-{}", env.clock.now().timestamp_millis())
    }

    /// Provider callback: `{public_url}/checkout/return?reference=..&booking_id=..`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Gateway`] if the public URL is not a valid base.
    pub fn callback_url(
        env: &SpacerEnvironment,
        booking_id: &BookingId,
        reference: &str,
    ) -> Result<String, ApiError> {
        let base = format!("{}/checkout/return", env.settings.public_url);
        reqwest::Url::parse_with_params(
            &base,
            &[("reference", reference), ("booking_id", booking_id.as_str())],
        )
        .map(String::from)
        .map_err(|e| ApiError::Gateway(format!("Invalid callback URL {base}: {e}")))
    }

    fn create_booking(
        state: &CheckoutState,
        env: &SpacerEnvironment,
        booking: NewBooking,
    ) -> Effect<CheckoutAction> {
        let api = env.api.clone();
        let token = state.token.clone();
        Effect::future(async move {
            Some(match api.create_booking(&token, &booking).await {
                Ok(created) => CheckoutAction::BookingCreated(created),
                Err(error) => CheckoutAction::BookingFailed(error),
            })
        })
    }

    fn initialize_payment(
        state: &CheckoutState,
        env: &SpacerEnvironment,
        booking_id: BookingId,
        amount: f64,
    ) -> Effect<CheckoutAction> {
        let env = env.clone();
        let token = state.token.clone();
        Effect::future(async move {
            Some(match Self::start_payment(&env, &token, booking_id, amount).await {
                Ok(checkout) => CheckoutAction::PaymentReady(checkout),
                Err(error) => CheckoutAction::PaymentFailed(error),
            })
        })
    }

    /// Look up the payer's email, then ask the provider for a checkout page.
    async fn start_payment(
        env: &SpacerEnvironment,
        token: &str,
        booking_id: BookingId,
        amount: f64,
    ) -> Result<Checkout, ApiError> {
        let reference = Self::reference(&booking_id, env);
        let callback_url = Self::callback_url(env, &booking_id, &reference)?;
        let profile = env.api.get_profile(token).await?;
        let init = PaymentInit {
            email: profile.email,
            amount,
            currency: env.settings.currency.clone(),
            reference,
            callback_url,
            booking_id,
        };
        env.payments.initialize(&init).await
    }

    fn verify(
        state: &CheckoutState,
        env: &SpacerEnvironment,
        booking_id: BookingId,
        reference: String,
    ) -> Effect<CheckoutAction> {
        let api = env.api.clone();
        let token = state.token.clone();
        Effect::future(async move {
            Some(
                match api.verify_booking(&token, &booking_id, &reference).await {
                    Ok(verified) => CheckoutAction::Verified(verified.payment_id),
                    Err(error) => CheckoutAction::VerificationFailed(error),
                },
            )
        })
    }

    fn ignore(state: &CheckoutState, action: &str) -> SmallVec<[Effect<CheckoutAction>; 4]> {
        tracing::debug!(phase = state.phase.name(), action, "Ignoring out-of-phase checkout action");
        SmallVec::new()
    }
}

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CheckoutAction::Submit { space_id, form } => {
                if state.phase != CheckoutPhase::Idle || state.alert.is_some() {
                    return Self::ignore(state, "submit");
                }

                let result = form.validate(env.clock.now());
                let terms = form.terms();
                state.form = form;
                match result {
                    Err(errors) => {
                        state.errors = errors;
                        SmallVec::new()
                    },
                    Ok(dates) => {
                        state.errors.clear();
                        let booking = NewBooking {
                            space_id,
                            start_datetime: dates.start,
                            end_datetime: dates.end,
                            terms,
                        };
                        smallvec![Self::create_booking(state, env, booking)]
                    },
                }
            },

            CheckoutAction::BookingCreated(created) => {
                if state.phase != CheckoutPhase::Idle || state.timed_out {
                    return Self::ignore(state, "booking_created");
                }

                tracing::info!(
                    booking_id = %created.booking_id,
                    total_amount = created.total_amount,
                    "Booking created"
                );
                state.phase = CheckoutPhase::BookingCreated {
                    booking_id: created.booking_id.clone(),
                    total_amount: created.total_amount,
                };
                smallvec![Self::initialize_payment(
                    state,
                    env,
                    created.booking_id,
                    created.total_amount,
                )]
            },

            CheckoutAction::BookingFailed(error) => {
                if state.phase != CheckoutPhase::Idle {
                    return Self::ignore(state, "booking_failed");
                }
                tracing::warn!(%error, "Booking creation failed");
                state.alert = Some(error.user_message());
                SmallVec::new()
            },

            CheckoutAction::PaymentReady(checkout) => {
                let CheckoutPhase::BookingCreated { booking_id, .. } = &state.phase else {
                    return Self::ignore(state, "payment_ready");
                };
                tracing::info!(%booking_id, reference = %checkout.reference, "Redirecting to checkout");
                state.phase = CheckoutPhase::PaymentRedirected {
                    booking_id: booking_id.clone(),
                    reference: checkout.reference,
                    checkout_url: Some(checkout.checkout_url),
                };
                SmallVec::new()
            },

            CheckoutAction::PaymentFailed(error) => {
                let CheckoutPhase::BookingCreated { booking_id, .. } = &state.phase else {
                    return Self::ignore(state, "payment_failed");
                };
                tracing::warn!(%booking_id, %error, "Payment initialization failed");
                state.alert = Some(format!(
                    "Payment initialization failed: {}",
                    error.user_message()
                ));
                SmallVec::new()
            },

            CheckoutAction::Returned {
                booking_id,
                reference,
            } => {
                let resumable = match &state.phase {
                    CheckoutPhase::Idle => true,
                    CheckoutPhase::PaymentRedirected { .. } => !state.verification_started,
                    _ => false,
                };
                if !resumable {
                    return Self::ignore(state, "returned");
                }

                let booking_id = booking_id.as_deref().and_then(super::non_blank);
                let reference = reference.as_deref().and_then(super::non_blank);
                let (Some(booking_id), Some(reference)) = (booking_id, reference) else {
                    tracing::warn!("Payment return without reference or booking id");
                    state.alert = Some(MISSING_REFERENCE.to_string());
                    return SmallVec::new();
                };

                let booking_id = BookingId::new(booking_id);
                let checkout_url = match &state.phase {
                    CheckoutPhase::PaymentRedirected { checkout_url, .. } => checkout_url.clone(),
                    _ => None,
                };
                state.phase = CheckoutPhase::PaymentRedirected {
                    booking_id: booking_id.clone(),
                    reference: reference.clone(),
                    checkout_url,
                };
                state.verification_started = true;
                smallvec![Self::verify(state, env, booking_id, reference)]
            },

            CheckoutAction::Verified(payment_id) => {
                let CheckoutPhase::PaymentRedirected { booking_id, .. } = &state.phase else {
                    return Self::ignore(state, "verified");
                };
                tracing::info!(%booking_id, %payment_id, "Payment verified");
                state.phase = CheckoutPhase::Verified {
                    booking_id: booking_id.clone(),
                    payment_id,
                };
                SmallVec::new()
            },

            CheckoutAction::VerificationFailed(error) => {
                let CheckoutPhase::PaymentRedirected { booking_id, .. } = &state.phase else {
                    return Self::ignore(state, "verification_failed");
                };
                tracing::warn!(%booking_id, %error, "Payment verification failed");
                state.phase = CheckoutPhase::VerificationFailed {
                    booking_id: booking_id.clone(),
                    message: format!("Payment verification failed: {}", error.user_message()),
                };
                SmallVec::new()
            },

            CheckoutAction::TimedOut => {
                let alert = match &state.phase {
                    CheckoutPhase::Idle if state.alert.is_none() && state.errors.is_empty() => {
                        tracing::warn!("Gave up waiting for booking creation");
                        BOOKING_PENDING
                    },
                    CheckoutPhase::BookingCreated { booking_id, .. } => {
                        tracing::warn!(%booking_id, "Gave up waiting for payment initialization");
                        PAYMENT_PENDING
                    },
                    _ => return Self::ignore(state, "timed_out"),
                };
                state.timed_out = true;
                state.alert = Some(alert.to_string());
                SmallVec::new()
            },
        }
    }
}
