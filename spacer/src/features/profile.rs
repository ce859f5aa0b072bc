//! Profile page: account details, the user's bookings and the update form.

use super::{IMAGE_FORMAT_ERROR, is_blank, is_image_file, looks_like_email};
use crate::environment::SpacerEnvironment;
use spacer_api::ApiError;
use spacer_api::models::{Booking, BookingFilter, BookingStatus, Profile, ProfileUpdate, Upload};
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::fmt;

/// Shown when `GET /profile` fails
pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile data. Please try again later.";
/// Shown when `GET /bookings/my-bookings` fails
pub const BOOKINGS_LOAD_FAILED: &str = "Failed to fetch bookings. Please try again later.";
/// Notice after a successful update
pub const PROFILE_UPDATED: &str = "Profile updated successfully.";
/// Alert after a failed update
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile. Please try again.";

/// Notices other pages hand over through `?notice=`.
#[must_use]
pub fn notice_text(key: &str) -> Option<&'static str> {
    match key {
        "booking-confirmed" => Some("Your booking has been confirmed successfully."),
        "review-submitted" => Some("Thank you! Your review has been submitted."),
        "profile-updated" => Some(PROFILE_UPDATED),
        _ => None,
    }
}

/// Profile update form as posted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    /// New username
    pub username: String,
    /// New email
    pub email: String,
    /// New avatar, if one was chosen
    pub picture: Option<Upload>,
}

impl fmt::Debug for ProfileForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("picture", &self.picture.as_ref().map(|p| &p.file_name))
            .finish()
    }
}

impl ProfileForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns every message that applies, in display order.
    pub fn validate(&self) -> Result<ProfileUpdate, Vec<String>> {
        let mut errors = Vec::new();
        if is_blank(&self.username) {
            errors.push("Username is required".to_string());
        }
        if is_blank(&self.email) {
            errors.push("Email is required".to_string());
        } else if !looks_like_email(&self.email) {
            errors.push("Please enter a valid email address".to_string());
        }
        if self
            .picture
            .as_ref()
            .is_some_and(|picture| !is_image_file(&picture.file_name))
        {
            errors.push(IMAGE_FORMAT_ERROR.to_string());
        }

        if errors.is_empty() {
            Ok(ProfileUpdate {
                username: self.username.trim().to_string(),
                email: self.email.trim().to_string(),
                picture: self.picture.clone(),
            })
        } else {
            Err(errors)
        }
    }
}

/// Profile page state.
#[derive(Clone, Debug, Default)]
pub struct ProfileState {
    /// Bearer token of the viewer
    pub token: String,
    /// Account details, once loaded
    pub profile: Option<Profile>,
    /// The viewer's bookings
    pub bookings: Vec<Booking>,
    /// Status filter applied to the bookings
    pub status_filter: Option<BookingStatus>,
    /// Profile fetch failure
    pub profile_error: Option<String>,
    /// Bookings fetch failure
    pub bookings_error: Option<String>,
    /// Update form echo
    pub form: ProfileForm,
    /// Update form validation messages
    pub form_errors: Vec<String>,
    /// Success notice
    pub notice: Option<String>,
    /// Update failure
    pub alert: Option<String>,
    /// The API rejected the token
    pub session_expired: bool,
}

impl ProfileState {
    /// Empty page for the given session
    #[must_use]
    pub fn for_session(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    fn note_failure(&mut self, error: &ApiError) {
        if matches!(error, ApiError::Unauthorized(_)) {
            self.session_expired = true;
        }
    }
}

/// Profile actions.
#[derive(Clone, Debug)]
pub enum ProfileAction {
    /// Load profile and bookings together
    Load {
        /// Booking status filter
        status: Option<BookingStatus>,
    },
    /// `GET /profile` succeeded
    ProfileLoaded(Profile),
    /// `GET /profile` failed
    ProfileFailed(ApiError),
    /// `GET /bookings/my-bookings` succeeded
    BookingsLoaded(Vec<Booking>),
    /// `GET /bookings/my-bookings` failed
    BookingsFailed(ApiError),
    /// Update form posted
    Update(ProfileForm),
    /// `PUT /profile` succeeded
    Updated,
    /// `PUT /profile` failed
    UpdateFailed(ApiError),
}

/// Reducer for the profile page
#[derive(Clone, Debug, Default)]
pub struct ProfileReducer;

impl ProfileReducer {
    fn fetch_profile(token: String, env: &SpacerEnvironment) -> Effect<ProfileAction> {
        let api = env.api.clone();
        Effect::future(async move {
            Some(match api.get_profile(&token).await {
                Ok(profile) => ProfileAction::ProfileLoaded(profile),
                Err(error) => ProfileAction::ProfileFailed(error),
            })
        })
    }

    fn fetch_bookings(
        token: String,
        status: Option<BookingStatus>,
        env: &SpacerEnvironment,
    ) -> Effect<ProfileAction> {
        let api = env.api.clone();
        let filter = BookingFilter {
            status,
            ..BookingFilter::default()
        };
        Effect::future(async move {
            Some(match api.my_bookings(&token, &filter).await {
                Ok(bookings) => ProfileAction::BookingsLoaded(bookings),
                Err(error) => ProfileAction::BookingsFailed(error),
            })
        })
    }
}

impl Reducer for ProfileReducer {
    type State = ProfileState;
    type Action = ProfileAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ProfileAction::Load { status } => {
                state.status_filter = status;
                state.profile_error = None;
                state.bookings_error = None;
                smallvec![
                    Self::fetch_profile(state.token.clone(), env),
                    Self::fetch_bookings(state.token.clone(), status, env),
                ]
            },

            ProfileAction::ProfileLoaded(profile) => {
                state.form = ProfileForm {
                    username: profile.username.clone(),
                    email: profile.email.clone(),
                    picture: None,
                };
                state.profile = Some(profile);
                SmallVec::new()
            },

            ProfileAction::ProfileFailed(error) => {
                tracing::warn!(%error, "Failed to load profile");
                state.note_failure(&error);
                state.profile_error = Some(PROFILE_LOAD_FAILED.to_string());
                SmallVec::new()
            },

            ProfileAction::BookingsLoaded(bookings) => {
                state.bookings = bookings;
                SmallVec::new()
            },

            ProfileAction::BookingsFailed(error) => {
                tracing::warn!(%error, "Failed to load bookings");
                state.note_failure(&error);
                state.bookings_error = Some(BOOKINGS_LOAD_FAILED.to_string());
                SmallVec::new()
            },

            ProfileAction::Update(form) => {
                state.notice = None;
                state.alert = None;
                let validated = form.validate();
                state.form = ProfileForm {
                    picture: None,
                    ..form
                };
                match validated {
                    Err(errors) => {
                        state.form_errors = errors;
                        SmallVec::new()
                    },
                    Ok(update) => {
                        state.form_errors.clear();
                        let api = env.api.clone();
                        let token = state.token.clone();
                        smallvec![Effect::future(async move {
                            Some(match api.update_profile(&token, update).await {
                                Ok(_) => ProfileAction::Updated,
                                Err(error) => ProfileAction::UpdateFailed(error),
                            })
                        })]
                    },
                }
            },

            ProfileAction::Updated => {
                state.notice = Some(PROFILE_UPDATED.to_string());
                smallvec![Self::fetch_profile(state.token.clone(), env)]
            },

            ProfileAction::UpdateFailed(error) => {
                tracing::warn!(%error, "Failed to update profile");
                state.note_failure(&error);
                state.alert = Some(PROFILE_UPDATE_FAILED.to_string());
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
    use spacer_runtime::Store;
    use spacer_testing::{MockSpacerApi, ReducerTest, assertions, fixtures};

    fn form(username: &str, email: &str) -> ProfileForm {
        ProfileForm {
            username: username.to_string(),
            email: email.to_string(),
            picture: None,
        }
    }

    #[test]
    fn test_notice_keys() {
        assert_eq!(
            notice_text("booking-confirmed"),
            Some("Your booking has been confirmed successfully.")
        );
        assert!(notice_text("review-submitted").is_some());
        assert_eq!(notice_text("<script>"), None);
    }

    #[test]
    fn test_update_validation() {
        assert_eq!(
            form("", "nope").validate().unwrap_err(),
            vec!["Username is required", "Please enter a valid email address"]
        );

        let mut with_pdf = form("amina", "amina@example.com");
        with_pdf.picture = Some(Upload {
            file_name: "cv.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Vec::new(),
        });
        assert_eq!(with_pdf.validate().unwrap_err(), vec![IMAGE_FORMAT_ERROR]);
    }

    #[test]
    fn test_load_fetches_both_in_parallel() {
        ReducerTest::new(ProfileReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(ProfileState::for_session("user-token"))
            .when_action(ProfileAction::Load {
                status: Some(BookingStatus::Confirmed),
            })
            .then_state(|state| {
                assert_eq!(state.status_filter, Some(BookingStatus::Confirmed));
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 2))
            .run();
    }

    #[tokio::test]
    async fn test_load_profile_and_filtered_bookings() {
        let api = MockSpacerApi::new()
            .with_profile(fixtures::profile("user"))
            .with_bookings(vec![
                fixtures::booking("b-1", BookingStatus::Pending),
                fixtures::booking("b-2", BookingStatus::Confirmed),
            ]);
        let store = Store::new(ProfileState::for_session("user-token"), ProfileReducer, api_env(&api));

        store
            .send_and_wait(
                ProfileAction::Load {
                    status: Some(BookingStatus::Confirmed),
                },
                WAIT,
            )
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.profile.unwrap().username, "amina");
        assert_eq!(state.form.email, "amina@example.com");
        assert_eq!(state.bookings.len(), 1);
        assert_eq!(
            api.last_filter().unwrap().status,
            Some(BookingStatus::Confirmed)
        );
    }

    #[tokio::test]
    async fn test_failures_are_reported_separately() {
        let api = MockSpacerApi::new()
            .with_profile(fixtures::profile("user"))
            .failing("my_bookings", ApiError::RequestFailed("refused".to_string()));
        let store = Store::new(ProfileState::for_session("user-token"), ProfileReducer, api_env(&api));

        store
            .send_and_wait(ProfileAction::Load { status: None }, WAIT)
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert!(state.profile.is_some());
        assert_eq!(state.profile_error, None);
        assert_eq!(state.bookings_error.as_deref(), Some(BOOKINGS_LOAD_FAILED));
        assert!(!state.session_expired);
    }

    #[tokio::test]
    async fn test_rejected_token_expires_session() {
        let api = MockSpacerApi::new();
        let store = Store::new(ProfileState::for_session("stale"), ProfileReducer, api_env(&api));

        store
            .send_and_wait(ProfileAction::Load { status: None }, WAIT)
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert!(state.session_expired);
        assert_eq!(state.profile_error.as_deref(), Some(PROFILE_LOAD_FAILED));
    }

    #[tokio::test]
    async fn test_update_then_reload() {
        let api = MockSpacerApi::new().with_profile(fixtures::profile("user"));
        let store = Store::new(ProfileState::for_session("user-token"), ProfileReducer, api_env(&api));

        store
            .send_and_wait(
                ProfileAction::Update(form("amina.w", "amina.w@example.com")),
                WAIT,
            )
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.notice.as_deref(), Some(PROFILE_UPDATED));
        assert_eq!(state.profile.unwrap().username, "amina.w");
        assert_eq!(api.calls(), vec!["update_profile", "get_profile"]);
    }

    #[tokio::test]
    async fn test_update_failure_alert() {
        let api = MockSpacerApi::new().failing(
            "update_profile",
            ApiError::Rejected {
                status: 400,
                message: "Email already in use".to_string(),
            },
        );
        let store = Store::new(ProfileState::for_session("user-token"), ProfileReducer, api_env(&api));

        store
            .send_and_wait(ProfileAction::Update(form("amina", "taken@example.com")), WAIT)
            .await
            .unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.alert.as_deref(), Some(PROFILE_UPDATE_FAILED));
        assert_eq!(state.form.email, "taken@example.com");
    }
}
