//! "Leave a Review" for a confirmed booking.

use super::is_blank;
use crate::environment::SpacerEnvironment;
use serde::Deserialize;
use spacer_api::ApiError;
use spacer_api::models::{Booking, BookingFilter, BookingId, Created, NewReview};
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Alert when the API gave no message
pub const REVIEW_FAILED: &str = "An error occurred while submitting the review.";
/// The booking is not among the user's bookings
pub const BOOKING_NOT_FOUND: &str = "Booking not found.";
/// The booking exists but is not confirmed
pub const NOT_REVIEWABLE: &str = "Only confirmed bookings can be reviewed.";

/// Review form as posted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewForm {
    /// Star rating, `1`..=`5`
    #[serde(default)]
    pub rating: String,
    /// Free text
    #[serde(default)]
    pub comment: String,
}

impl ReviewForm {
    /// Validate rating and comment.
    ///
    /// # Errors
    ///
    /// Returns every message that applies.
    pub fn validate(&self) -> Result<NewReview, Vec<String>> {
        let rating = self
            .rating
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|rating| (1..=5).contains(rating));

        let mut errors = Vec::new();
        if rating.is_none() {
            errors.push("Please select a rating between 1 and 5".to_string());
        }
        if is_blank(&self.comment) {
            errors.push("Comment is required".to_string());
        }

        match rating {
            Some(rating) if errors.is_empty() => Ok(NewReview {
                rating,
                comment: self.comment.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Review page state.
#[derive(Clone, Debug, Default)]
pub struct ReviewState {
    /// Bearer token of the reviewer
    pub token: String,
    /// Booking requested in the URL
    pub booking_id: Option<BookingId>,
    /// The booking, once found among the user's bookings
    pub booking: Option<Booking>,
    /// Values echoed back into the inputs
    pub form: ReviewForm,
    /// Validation messages from the last check
    pub errors: Vec<String>,
    /// Whether the submit button is enabled
    pub can_submit: bool,
    /// Failure alert
    pub alert: Option<String>,
    /// The review was accepted
    pub submitted: bool,
}

impl ReviewState {
    /// Empty page for the given session
    #[must_use]
    pub fn for_session(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Whether the loaded booking may be reviewed
    #[must_use]
    pub fn reviewable(&self) -> bool {
        self.booking.as_ref().is_some_and(Booking::can_review)
    }
}

/// Review actions.
#[derive(Clone, Debug)]
pub enum ReviewAction {
    /// Look the booking up
    Open {
        /// Booking to review
        booking_id: BookingId,
    },
    /// The user's bookings arrived
    BookingsLoaded(Vec<Booking>),
    /// The user's bookings could not be fetched
    BookingsFailed(ApiError),
    /// Re-render with the validation result
    Check(ReviewForm),
    /// Post the review
    Submit(ReviewForm),
    /// `POST /spaces/{id}/reviews` succeeded
    Submitted(Created<String>),
    /// `POST /spaces/{id}/reviews` failed
    SubmitFailed(ApiError),
}

/// Reducer for the review page
#[derive(Clone, Debug, Default)]
pub struct ReviewReducer;

impl ReviewReducer {
    fn check(state: &mut ReviewState, form: ReviewForm) -> Option<NewReview> {
        let result = form.validate();
        state.form = form;
        state.can_submit = result.is_ok() && state.reviewable();
        match result {
            Ok(review) => {
                state.errors.clear();
                Some(review)
            },
            Err(errors) => {
                state.errors = errors;
                None
            },
        }
    }
}

impl Reducer for ReviewReducer {
    type State = ReviewState;
    type Action = ReviewAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ReviewAction::Open { booking_id } => {
                state.booking_id = Some(booking_id);
                state.booking = None;
                state.alert = None;

                let api = env.api.clone();
                let token = state.token.clone();
                smallvec![Effect::future(async move {
                    Some(match api.my_bookings(&token, &BookingFilter::default()).await {
                        Ok(bookings) => ReviewAction::BookingsLoaded(bookings),
                        Err(error) => ReviewAction::BookingsFailed(error),
                    })
                })]
            },

            ReviewAction::BookingsLoaded(bookings) => {
                let wanted = state.booking_id.as_ref();
                state.booking = bookings
                    .into_iter()
                    .find(|booking| Some(&booking.booking_id) == wanted);
                state.alert = match &state.booking {
                    None => Some(BOOKING_NOT_FOUND.to_string()),
                    Some(booking) if !booking.can_review() => Some(NOT_REVIEWABLE.to_string()),
                    Some(_) => None,
                };
                SmallVec::new()
            },

            ReviewAction::BookingsFailed(error) => {
                tracing::warn!(%error, "Failed to load bookings for review");
                state.alert = Some(error.user_message());
                SmallVec::new()
            },

            ReviewAction::Check(form) => {
                Self::check(state, form);
                SmallVec::new()
            },

            ReviewAction::Submit(form) => {
                if state.submitted {
                    return SmallVec::new();
                }
                let Some(review) = Self::check(state, form) else {
                    return SmallVec::new();
                };
                let Some(space_id) = state
                    .booking
                    .as_ref()
                    .filter(|booking| booking.can_review())
                    .map(|booking| booking.space.space_id.clone())
                else {
                    return SmallVec::new();
                };
                state.alert = None;

                let api = env.api.clone();
                let token = state.token.clone();
                smallvec![Effect::future(async move {
                    Some(match api.submit_review(&token, &space_id, &review).await {
                        Ok(created) => ReviewAction::Submitted(created),
                        Err(error) => ReviewAction::SubmitFailed(error),
                    })
                })]
            },

            ReviewAction::Submitted(created) => {
                tracing::info!(review_id = %created.id, "Review submitted");
                state.submitted = true;
                SmallVec::new()
            },

            ReviewAction::SubmitFailed(error) => {
                tracing::warn!(%error, "Failed to submit review");
                state.alert = Some(
                    error
                        .server_message()
                        .map_or_else(|| REVIEW_FAILED.to_string(), str::to_string),
                );
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::test_support::{WAIT, api_env};
    use spacer_api::models::BookingStatus;
    use spacer_runtime::Store;
    use spacer_testing::{MockSpacerApi, ReducerTest, assertions, fixtures};

    fn form(rating: &str, comment: &str) -> ReviewForm {
        ReviewForm {
            rating: rating.to_string(),
            comment: comment.to_string(),
        }
    }

    fn api() -> MockSpacerApi {
        MockSpacerApi::new().with_bookings(vec![
            fixtures::booking("b-pending", BookingStatus::Pending),
            fixtures::booking("b-confirmed", BookingStatus::Confirmed),
        ])
    }

    type ReviewStore = Store<ReviewState, ReviewAction, SpacerEnvironment, ReviewReducer>;

    async fn opened(api: &MockSpacerApi, booking: &str) -> ReviewStore {
        let store = Store::new(ReviewState::for_session("user-token"), ReviewReducer, api_env(api));
        store
            .send_and_wait(
                ReviewAction::Open {
                    booking_id: BookingId::new(booking),
                },
                WAIT,
            )
            .await
            .unwrap();
        store
    }

    #[test]
    fn test_rating_and_comment_rules() {
        assert!(form("5", "Lovely").validate().is_ok());
        assert_eq!(
            form("0", " ").validate().unwrap_err(),
            vec!["Please select a rating between 1 and 5", "Comment is required"]
        );
        assert!(form("6", "Too good").validate().is_err());
        assert!(form("", "No stars").validate().is_err());
    }

    #[test]
    fn test_check_without_booking_keeps_submit_disabled() {
        ReducerTest::new(ReviewReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(ReviewState::for_session("user-token"))
            .when_action(ReviewAction::Check(form("4", "Nice")))
            .then_state(|state| {
                assert!(state.errors.is_empty());
                assert!(!state.can_submit);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn test_confirmed_booking_can_be_reviewed() {
        let api = api();
        let store = opened(&api, "b-confirmed").await;
        assert!(store.state(ReviewState::reviewable).await);

        store
            .send_and_wait(ReviewAction::Submit(form("5", "Great light")), WAIT)
            .await
            .unwrap();

        assert!(store.state(|s| s.submitted).await);
        let (space_id, review) = api.submitted_reviews().remove(0);
        assert_eq!(space_id.as_str(), "s-1");
        assert_eq!(review.rating, 5);
    }

    #[tokio::test]
    async fn test_pending_booking_cannot_be_reviewed() {
        let api = api();
        let store = opened(&api, "b-pending").await;

        store
            .send_and_wait(ReviewAction::Submit(form("5", "Great light")), WAIT)
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.alert.as_deref(), Some(NOT_REVIEWABLE));
        assert!(!state.can_submit);
        assert!(api.submitted_reviews().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_booking() {
        let store = opened(&api(), "b-other").await;
        assert_eq!(
            store.state(|s| s.alert.clone()).await.as_deref(),
            Some(BOOKING_NOT_FOUND)
        );
    }

    #[tokio::test]
    async fn test_submit_failure_messages() {
        let api = api().failing(
            "submit_review",
            ApiError::Rejected {
                status: 400,
                message: "You have already reviewed this space".to_string(),
            },
        );
        let store = opened(&api, "b-confirmed").await;
        store
            .send_and_wait(ReviewAction::Submit(form("4", "Again")), WAIT)
            .await
            .unwrap();
        assert_eq!(
            store.state(|s| s.alert.clone()).await.as_deref(),
            Some("You have already reviewed this space")
        );

        let api = self::api().failing(
            "submit_review",
            ApiError::ResponseParseFailed("eof".to_string()),
        );
        let store = opened(&api, "b-confirmed").await;
        store
            .send_and_wait(ReviewAction::Submit(form("4", "Again")), WAIT)
            .await
            .unwrap();
        assert_eq!(
            store.state(|s| s.alert.clone()).await.as_deref(),
            Some(REVIEW_FAILED)
        );
    }
}
