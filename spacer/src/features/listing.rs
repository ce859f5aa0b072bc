//! "List Your Place": the listing creation form.

use super::{IMAGE_FORMAT_ERROR, is_blank, is_image_file, non_blank, parse_amount, parse_positive};
use crate::environment::SpacerEnvironment;
use spacer_api::ApiError;
use spacer_api::models::{Created, NewSpace, SpaceId, SpaceType, Upload};
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::fmt;

/// Notice shown after a successful submission
pub const LISTING_CREATED: &str = "Your space has been successfully added!";

/// Alert shown when the API could not be reached
pub const LISTING_FAILED: &str = "An error occurred while adding your space. Please try again.";

/// Raw listing form as posted.
#[derive(Clone, Default, PartialEq)]
pub struct ListingForm {
    /// Display name
    pub name: String,
    /// Space type wire name
    pub space_type: String,
    /// Free text description
    pub description: String,
    /// Price per hour
    pub hourly_rate: String,
    /// Price per day
    pub day_rate: String,
    /// Maximum number of people
    pub capacity: String,
    /// Address
    pub location: String,
    /// Selected images (empty file inputs already dropped)
    pub images: Vec<Upload>,
}

impl fmt::Debug for ListingForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let images: Vec<&str> = self.images.iter().map(|i| i.file_name.as_str()).collect();
        f.debug_struct("ListingForm")
            .field("name", &self.name)
            .field("space_type", &self.space_type)
            .field("hourly_rate", &self.hourly_rate)
            .field("day_rate", &self.day_rate)
            .field("capacity", &self.capacity)
            .field("location", &self.location)
            .field("images", &images)
            .finish_non_exhaustive()
    }
}

/// Per-field validation messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ListingErrors {
    pub name: Option<String>,
    pub space_type: Option<String>,
    pub description: Option<String>,
    pub hourly_rate: Option<String>,
    pub day_rate: Option<String>,
    pub capacity: Option<String>,
    pub location: Option<String>,
    pub images: Option<String>,
}

impl ListingErrors {
    /// Whether no field failed
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.space_type.is_none()
            && self.description.is_none()
            && self.hourly_rate.is_none()
            && self.day_rate.is_none()
            && self.capacity.is_none()
            && self.location.is_none()
            && self.images.is_none()
    }
}

fn required(value: &str, message: &str) -> Option<String> {
    is_blank(value).then(|| message.to_string())
}

impl ListingForm {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field is missing or malformed.
    pub fn validate(&self) -> Result<NewSpace, ListingErrors> {
        let hourly_rate = parse_amount(&self.hourly_rate);
        let day_rate = parse_amount(&self.day_rate);
        let capacity = parse_positive(&self.capacity);
        let space_type = non_blank(&self.space_type).map(SpaceType::from);

        let images = if self.images.is_empty() {
            Some("Image is required".to_string())
        } else if self.images.iter().any(|image| !is_image_file(&image.file_name)) {
            Some(IMAGE_FORMAT_ERROR.to_string())
        } else {
            None
        };

        let errors = ListingErrors {
            name: required(&self.name, "Name is required"),
            space_type: space_type
                .is_none()
                .then(|| "Type is required".to_string()),
            description: required(&self.description, "Description is required"),
            hourly_rate: hourly_rate
                .is_none()
                .then(|| "Valid price is required".to_string()),
            day_rate: day_rate
                .is_none()
                .then(|| "Valid day rate is required".to_string()),
            capacity: capacity
                .is_none()
                .then(|| "Valid capacity is required".to_string()),
            location: required(&self.location, "Address is required"),
            images,
        };

        match (space_type, hourly_rate, day_rate, capacity) {
            (Some(space_type), Some(hourly_rate), Some(day_rate), Some(capacity))
                if errors.is_empty() =>
            {
                Ok(NewSpace {
                    name: self.name.trim().to_string(),
                    description: self.description.trim().to_string(),
                    location: self.location.trim().to_string(),
                    space_type,
                    hourly_rate,
                    day_rate,
                    capacity,
                    images: self.images.clone(),
                })
            },
            _ => Err(errors),
        }
    }
}

/// Listing page state.
#[derive(Clone, Debug, Default)]
pub struct ListingState {
    /// Bearer token of the submitting user
    pub token: String,
    /// Values echoed back into the inputs
    pub form: ListingForm,
    /// Field errors from the last submission
    pub errors: ListingErrors,
    /// Failure alert
    pub alert: Option<String>,
    /// Success notice
    pub notice: Option<String>,
    /// A submission is in flight
    pub submitting: bool,
}

impl ListingState {
    /// Empty form for the given session
    #[must_use]
    pub fn for_session(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }
}

/// Listing actions.
#[derive(Clone, Debug)]
pub enum ListingAction {
    /// Form posted
    Submit(ListingForm),
    /// `POST /spaces` succeeded
    Created(Created<SpaceId>),
    /// `POST /spaces` failed
    CreateFailed(ApiError),
}

/// Reducer for the listing form
#[derive(Clone, Debug, Default)]
pub struct ListingReducer;

impl Reducer for ListingReducer {
    type State = ListingState;
    type Action = ListingAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ListingAction::Submit(form) => {
                if state.submitting {
                    return SmallVec::new();
                }
                state.alert = None;
                state.notice = None;

                let validated = form.validate();
                // Uploads are never echoed back; the browser cannot refill file inputs.
                state.form = ListingForm {
                    images: Vec::new(),
                    ..form
                };
                match validated {
                    Err(errors) => {
                        state.errors = errors;
                        SmallVec::new()
                    },
                    Ok(space) => {
                        state.errors = ListingErrors::default();
                        state.submitting = true;

                        let api = env.api.clone();
                        let token = state.token.clone();
                        smallvec![Effect::future(async move {
                            Some(match api.create_space(&token, space).await {
                                Ok(created) => ListingAction::Created(created),
                                Err(error) => ListingAction::CreateFailed(error),
                            })
                        })]
                    },
                }
            },

            ListingAction::Created(created) => {
                tracing::info!(space_id = %created.id, "Space listed");
                state.submitting = false;
                state.form = ListingForm::default();
                state.notice = Some(LISTING_CREATED.to_string());
                SmallVec::new()
            },

            ListingAction::CreateFailed(error) => {
                tracing::warn!(%error, "Failed to list space");
                state.submitting = false;
                state.alert = Some(
                    error
                        .server_message()
                        .map_or_else(|| LISTING_FAILED.to_string(), |m| format!("Error: {m}")),
                );
                SmallVec::new()
            },
        }
    }
}
