//! Admin back-office: spaces, users and bookings.
//!
//! Every call carries the admin's token; the API enforces the role. Forms
//! are validated here only for shape (required fields, numbers).

use super::booking::parse_input;
use super::{is_blank, looks_like_email, non_blank, parse_amount, parse_positive};
use crate::environment::SpacerEnvironment;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use spacer_api::ApiError;
use spacer_api::models::{
    AdminSpace, AdminSpaceInput, AdminUser, AdminUserInput, Booking, BookingFilter, BookingId,
    BookingStatus, Role, SpaceId, SpaceType, UserId,
};
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::fmt;

/// Notice after a space create/update
pub const SPACE_SAVED: &str = "Space saved.";
/// Notice after a space delete
pub const SPACE_DELETED: &str = "Space deleted.";
/// Notice after a user create/update
pub const USER_SAVED: &str = "User saved.";
/// Notice after a user delete
pub const USER_DELETED: &str = "User deleted.";

/// Roles offered when `GET /roles` is unavailable.
#[must_use]
pub fn default_roles() -> Vec<Role> {
    [(1, "Admin"), (2, "Space Manager"), (3, "User")]
        .into_iter()
        .map(|(role_id, role_name)| Role {
            role_id,
            role_name: role_name.to_string(),
        })
        .collect()
}

/// Back-office tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdminTab {
    /// Space management
    #[default]
    Spaces,
    /// User management
    Users,
    /// Booking overview
    Bookings,
}

impl AdminTab {
    /// Every tab, in display order
    pub const ALL: [Self; 3] = [Self::Spaces, Self::Users, Self::Bookings];

    /// Parse `?tab=`, defaulting to spaces
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("users") => Self::Users,
            Some("bookings") => Self::Bookings,
            _ => Self::Spaces,
        }
    }

    /// Query value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spaces => "spaces",
            Self::Users => "users",
            Self::Bookings => "bookings",
        }
    }

    /// Tab label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spaces => "Spaces",
            Self::Users => "Users",
            Self::Bookings => "Bookings",
        }
    }
}

/// Space create/update form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct AdminSpaceForm {
    pub name: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub space_type: String,
    pub hourly_rate: String,
    pub day_rate: String,
    pub capacity: String,
    pub status: String,
}

impl From<&AdminSpace> for AdminSpaceForm {
    fn from(admin: &AdminSpace) -> Self {
        let space = &admin.space;
        Self {
            name: space.name.clone(),
            description: space.description.clone(),
            location: space.location.clone(),
            space_type: space.space_type.as_str().to_string(),
            hourly_rate: space.hourly_rate.to_string(),
            day_rate: space.day_rate.to_string(),
            capacity: space.capacity.to_string(),
            status: space.status.clone(),
        }
    }
}

impl AdminSpaceForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns every message that applies.
    pub fn validate(&self) -> Result<AdminSpaceInput, Vec<String>> {
        let mut errors = Vec::new();
        if is_blank(&self.name) {
            errors.push("Name is required".to_string());
        }
        if is_blank(&self.location) {
            errors.push("Location is required".to_string());
        }
        let space_type = non_blank(&self.space_type).map(SpaceType::from);
        if space_type.is_none() {
            errors.push("Type is required".to_string());
        }
        let hourly_rate = parse_amount(&self.hourly_rate);
        if hourly_rate.is_none() {
            errors.push("Hourly rate must be a non-negative number".to_string());
        }
        let day_rate = parse_amount(&self.day_rate);
        if day_rate.is_none() {
            errors.push("Day rate must be a non-negative number".to_string());
        }
        let capacity = parse_positive(&self.capacity);
        if capacity.is_none() {
            errors.push("Capacity must be a positive whole number".to_string());
        }

        match (space_type, hourly_rate, day_rate, capacity) {
            (Some(space_type), Some(hourly_rate), Some(day_rate), Some(capacity))
                if errors.is_empty() =>
            {
                Ok(AdminSpaceInput {
                    name: self.name.trim().to_string(),
                    description: self.description.trim().to_string(),
                    location: self.location.trim().to_string(),
                    space_type,
                    hourly_rate,
                    day_rate,
                    capacity,
                    status: non_blank(&self.status),
                })
            },
            _ => Err(errors),
        }
    }
}

/// User create/update form.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct AdminUserForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: String,
}

impl fmt::Debug for AdminUserForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUserForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

impl From<&AdminUser> for AdminUserForm {
    fn from(user: &AdminUser) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            password: String::new(),
            role_id: user.role.role_id.to_string(),
        }
    }
}

impl AdminUserForm {
    /// Validate the form; the password is only required when `creating`.
    ///
    /// # Errors
    ///
    /// Returns every message that applies.
    pub fn validate(&self, creating: bool) -> Result<AdminUserInput, Vec<String>> {
        let mut errors = Vec::new();
        if is_blank(&self.username) {
            errors.push("Username is required".to_string());
        }
        if is_blank(&self.email) {
            errors.push("Email is required".to_string());
        } else if !looks_like_email(&self.email) {
            errors.push("Please enter a valid email address".to_string());
        }
        if creating && is_blank(&self.password) {
            errors.push("Password is required".to_string());
        }
        let role_id = parse_positive(&self.role_id);
        if role_id.is_none() {
            errors.push("Role is required".to_string());
        }

        if errors.is_empty() {
            Ok(AdminUserInput {
                username: non_blank(&self.username),
                email: non_blank(&self.email),
                password: (!is_blank(&self.password)).then(|| self.password.clone()),
                role_id,
            })
        } else {
            Err(errors)
        }
    }
}

/// Bookings tab filter as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookingFilterForm {
    /// Status wire value, empty for all
    pub status: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`
    pub start_date: String,
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`
    pub end_date: String,
}

fn parse_bound(raw: &str, day_time: NaiveTime) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    parse_input(raw).or_else(|| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|date| date.and_time(day_time))
    })
}

impl BookingFilterForm {
    /// API filter; unparseable values are dropped.
    ///
    /// A bare end date covers that whole day.
    #[must_use]
    pub fn to_filter(&self) -> BookingFilter {
        BookingFilter {
            status: BookingStatus::parse(&self.status),
            start_date: parse_bound(&self.start_date, NaiveTime::MIN),
            end_date: parse_bound(
                &self.end_date,
                NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
            ),
        }
    }
}

/// Back-office state.
#[derive(Clone, Debug, Default)]
pub struct AdminState {
    /// Admin bearer token
    pub token: String,
    /// Active tab
    pub tab: AdminTab,
    /// All spaces
    pub spaces: Vec<AdminSpace>,
    /// All users
    pub users: Vec<AdminUser>,
    /// Assignable roles
    pub roles: Vec<Role>,
    /// Bookings matching the filter
    pub bookings: Vec<Booking>,
    /// Bookings filter echo
    pub filter: BookingFilterForm,
    /// Booking whose details are open
    pub viewing_booking: Option<BookingId>,
    /// Space being edited, `None` for a new one
    pub editing_space: Option<SpaceId>,
    /// Space form echo
    pub space_form: AdminSpaceForm,
    /// Space form messages
    pub space_errors: Vec<String>,
    /// User being edited, `None` for a new one
    pub editing_user: Option<UserId>,
    /// User form echo
    pub user_form: AdminUserForm,
    /// User form messages
    pub user_errors: Vec<String>,
    /// Listing fetch failure
    pub load_error: Option<String>,
    /// Mutation success
    pub notice: Option<String>,
    /// Mutation failure
    pub alert: Option<String>,
}

impl AdminState {
    /// Empty back-office for the given session
    #[must_use]
    pub fn for_session(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }
}

/// Back-office actions.
#[derive(Clone, Debug)]
pub enum AdminAction {
    /// Load a tab
    Load {
        /// Tab to show
        tab: AdminTab,
        /// Bookings filter (bookings tab only)
        filter: BookingFilterForm,
    },
    /// Spaces listing arrived
    SpacesLoaded(Vec<AdminSpace>),
    /// Users listing arrived
    UsersLoaded(Vec<AdminUser>),
    /// Roles arrived
    RolesLoaded(Vec<Role>),
    /// Roles unavailable
    RolesFailed(ApiError),
    /// Bookings listing arrived
    BookingsLoaded(Vec<Booking>),
    /// A listing failed
    LoadFailed(ApiError),
    /// Prefill the space form from the loaded list
    EditSpace(SpaceId),
    /// Prefill the user form from the loaded list
    EditUser(UserId),
    /// Open the details of a loaded booking
    ViewBooking(BookingId),
    /// Create (`space_id: None`) or update a space
    SaveSpace {
        /// Space to update
        space_id: Option<SpaceId>,
        /// Posted form
        form: AdminSpaceForm,
    },
    /// Delete a space
    DeleteSpace(SpaceId),
    /// Create (`user_id: None`) or update a user
    SaveUser {
        /// User to update
        user_id: Option<UserId>,
        /// Posted form
        form: AdminUserForm,
    },
    /// Delete a user
    DeleteUser(UserId),
    /// A mutation succeeded
    Mutated {
        /// Notice to show
        notice: &'static str,
        /// Tab whose listing to refresh
        refresh: AdminTab,
    },
    /// A mutation failed
    MutationFailed(ApiError),
}

/// Reducer for the back-office
#[derive(Clone, Debug, Default)]
pub struct AdminReducer;

type AdminEffects = SmallVec<[Effect<AdminAction>; 4]>;

impl AdminReducer {
    fn load(tab: AdminTab, token: &str, filter: BookingFilter, env: &SpacerEnvironment) -> AdminEffects {
        match tab {
            AdminTab::Spaces => smallvec![
                Self::list_spaces(token.to_string(), env),
                Self::list_users(token.to_string(), env),
            ],
            AdminTab::Users => {
                let api = env.api.clone();
                smallvec![
                    Self::list_users(token.to_string(), env),
                    Effect::future(async move {
                        Some(match api.roles().await {
                            Ok(roles) => AdminAction::RolesLoaded(roles),
                            Err(error) => AdminAction::RolesFailed(error),
                        })
                    }),
                ]
            },
            AdminTab::Bookings => {
                let api = env.api.clone();
                let token = token.to_string();
                smallvec![Effect::future(async move {
                    Some(match api.admin_list_bookings(&token, &filter).await {
                        Ok(bookings) => AdminAction::BookingsLoaded(bookings),
                        Err(error) => AdminAction::LoadFailed(error),
                    })
                })]
            },
        }
    }

    fn list_spaces(token: String, env: &SpacerEnvironment) -> Effect<AdminAction> {
        let api = env.api.clone();
        Effect::future(async move {
            Some(match api.admin_list_spaces(&token).await {
                Ok(spaces) => AdminAction::SpacesLoaded(spaces),
                Err(error) => AdminAction::LoadFailed(error),
            })
        })
    }

    fn list_users(token: String, env: &SpacerEnvironment) -> Effect<AdminAction> {
        let api = env.api.clone();
        Effect::future(async move {
            Some(match api.admin_list_users(&token).await {
                Ok(users) => AdminAction::UsersLoaded(users),
                Err(error) => AdminAction::LoadFailed(error),
            })
        })
    }

    fn mutated<T>(
        result: Result<T, ApiError>,
        notice: &'static str,
        refresh: AdminTab,
    ) -> Option<AdminAction> {
        Some(match result {
            Ok(_) => AdminAction::Mutated { notice, refresh },
            Err(error) => AdminAction::MutationFailed(error),
        })
    }
}

impl Reducer for AdminReducer {
    type State = AdminState;
    type Action = AdminAction;
    type Environment = SpacerEnvironment;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AdminAction::Load { tab, filter } => {
                state.tab = tab;
                state.load_error = None;
                let api_filter = filter.to_filter();
                state.filter = filter;
                Self::load(tab, &state.token, api_filter, env)
            },

            AdminAction::SpacesLoaded(spaces) => {
                state.spaces = spaces;
                SmallVec::new()
            },

            AdminAction::UsersLoaded(users) => {
                state.users = users;
                SmallVec::new()
            },

            AdminAction::RolesLoaded(roles) if !roles.is_empty() => {
                state.roles = roles;
                SmallVec::new()
            },

            AdminAction::RolesLoaded(_) => {
                state.roles = default_roles();
                SmallVec::new()
            },

            AdminAction::RolesFailed(error) => {
                tracing::debug!(%error, "Roles unavailable, using defaults");
                state.roles = default_roles();
                SmallVec::new()
            },

            AdminAction::BookingsLoaded(bookings) => {
                state.bookings = bookings;
                SmallVec::new()
            },

            AdminAction::LoadFailed(error) => {
                tracing::warn!(%error, tab = state.tab.as_str(), "Admin listing failed");
                state.load_error = Some(error.user_message());
                SmallVec::new()
            },

            AdminAction::EditSpace(space_id) => {
                if let Some(space) = state.spaces.iter().find(|s| s.space.space_id == space_id) {
                    state.space_form = AdminSpaceForm::from(space);
                    state.editing_space = Some(space_id);
                }
                SmallVec::new()
            },

            AdminAction::ViewBooking(booking_id) => {
                if state.bookings.iter().any(|b| b.booking_id == booking_id) {
                    state.viewing_booking = Some(booking_id);
                } else {
                    tracing::debug!(%booking_id, "Booking not in the loaded list");
                }
                SmallVec::new()
            },

            AdminAction::EditUser(user_id) => {
                if let Some(user) = state.users.iter().find(|u| u.user_id == user_id) {
                    state.user_form = AdminUserForm::from(user);
                    state.editing_user = Some(user_id);
                }
                SmallVec::new()
            },

            AdminAction::SaveSpace { space_id, form } => {
                state.notice = None;
                state.alert = None;
                let validated = form.validate();
                state.space_form = form;
                state.editing_space.clone_from(&space_id);
                let input = match validated {
                    Ok(input) => input,
                    Err(errors) => {
                        state.space_errors = errors;
                        return SmallVec::new();
                    },
                };
                state.space_errors.clear();

                let api = env.api.clone();
                let token = state.token.clone();
                smallvec![Effect::future(async move {
                    match space_id {
                        Some(id) => Self::mutated(
                            api.admin_update_space(&token, &id, &input).await,
                            SPACE_SAVED,
                            AdminTab::Spaces,
                        ),
                        None => Self::mutated(
                            api.admin_create_space(&token, &input).await,
                            SPACE_SAVED,
                            AdminTab::Spaces,
                        ),
                    }
                })]
            },

            AdminAction::DeleteSpace(space_id) => {
                state.notice = None;
                state.alert = None;
                let api = env.api.clone();
                let token = state.token.clone();
                smallvec![Effect::future(async move {
                    Self::mutated(
                        api.admin_delete_space(&token, &space_id).await,
                        SPACE_DELETED,
                        AdminTab::Spaces,
                    )
                })]
            },

            AdminAction::SaveUser { user_id, form } => {
                state.notice = None;
                state.alert = None;
                let validated = form.validate(user_id.is_none());
                // The password is never echoed back.
                state.user_form = AdminUserForm {
                    password: String::new(),
                    ..form
                };
                state.editing_user.clone_from(&user_id);
                let input = match validated {
                    Ok(input) => input,
                    Err(errors) => {
                        state.user_errors = errors;
                        return SmallVec::new();
                    },
                };
                state.user_errors.clear();

                let api = env.api.clone();
                let token = state.token.clone();
                smallvec![Effect::future(async move {
                    match user_id {
                        Some(id) => Self::mutated(
                            api.admin_update_user(&token, &id, &input).await,
                            USER_SAVED,
                            AdminTab::Users,
                        ),
                        None => Self::mutated(
                            api.admin_create_user(&token, &input).await,
                            USER_SAVED,
                            AdminTab::Users,
                        ),
                    }
                })]
            },

            AdminAction::DeleteUser(user_id) => {
                state.notice = None;
                state.alert = None;
                let api = env.api.clone();
                let token = state.token.clone();
                smallvec![Effect::future(async move {
                    Self::mutated(
                        api.admin_delete_user(&token, &user_id).await,
                        USER_DELETED,
                        AdminTab::Users,
                    )
                })]
            },

            AdminAction::Mutated { notice, refresh } => {
                tracing::info!(notice, "Admin mutation applied");
                state.notice = Some(notice.to_string());
                match refresh {
                    AdminTab::Spaces => {
                        state.space_form = AdminSpaceForm::default();
                        state.editing_space = None;
                        smallvec![Self::list_spaces(state.token.clone(), env)]
                    },
                    AdminTab::Users => {
                        state.user_form = AdminUserForm::default();
                        state.editing_user = None;
                        smallvec![Self::list_users(state.token.clone(), env)]
                    },
                    AdminTab::Bookings => SmallVec::new(),
                }
            },

            AdminAction::MutationFailed(error) => {
                tracing::warn!(%error, "Admin mutation failed");
                state.alert = Some(error.user_message());
                SmallVec::new()
            },
        }
    }
}
