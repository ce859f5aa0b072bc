//! In-memory stand-ins for the Spacer API and the payment provider.
//!
//! Both mocks record every call by operation name so tests can assert what
//! a flow did (and, just as often, what it did not do).

use async_trait::async_trait;
use spacer_api::models::{
    Ack, AdminSpace, AdminSpaceInput, AdminUser, AdminUserInput, Booking, BookingFilter,
    BookingId, Created, CreatedBooking, LoginRequest, LoginResponse, NewBooking, NewReview,
    NewSpace, PaymentId, Profile, ProfileUpdate, RegisterRequest, Role, Space, SpaceDetail,
    SpaceId, SpacePage, SpaceQuery, SpaceReview, UserId, VerifiedBooking,
};
use spacer_api::{ApiError, Checkout, PaymentGateway, PaymentInit, SpacerApi};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct MockApiState {
    login: Option<LoginResponse>,
    spaces: Vec<Space>,
    reviews: HashMap<SpaceId, Vec<SpaceReview>>,
    profile: Option<Profile>,
    bookings: Vec<Booking>,
    admin_spaces: Vec<AdminSpace>,
    users: Vec<AdminUser>,
    roles: Vec<Role>,
    booking_total: f64,
    latency: Duration,
    failures: HashMap<&'static str, ApiError>,
    calls: Vec<&'static str>,
    created_bookings: Vec<NewBooking>,
    created_spaces: Vec<NewSpace>,
    submitted_reviews: Vec<(SpaceId, NewReview)>,
    verified: Vec<(BookingId, String)>,
    admin_space_writes: Vec<(Option<SpaceId>, AdminSpaceInput)>,
    admin_user_writes: Vec<(Option<UserId>, AdminUserInput)>,
    deleted: Vec<String>,
    profile_updates: Vec<ProfileUpdate>,
    last_filter: Option<BookingFilter>,
}

/// In-memory [`SpacerApi`].
///
/// Cloning shares the underlying state, so a test can keep a handle while
/// the environment owns another.
///
/// # Example
///
/// ```
/// use spacer_api::ApiError;
/// use spacer_testing::{MockSpacerApi, fixtures};
///
/// let api = MockSpacerApi::new()
///     .with_spaces(vec![fixtures::space("s-1", "Rose Garden")])
///     .failing("create_booking", ApiError::Rejected {
///         status: 400,
///         message: "Space is not available".to_string(),
///     });
/// assert!(api.calls().is_empty());
/// ```
#[derive(Clone, Default)]
pub struct MockSpacerApi {
    inner: Arc<Mutex<MockApiState>>,
}

impl MockSpacerApi {
    /// Create an empty mock
    #[must_use]
    pub fn new() -> Self {
        let mock = Self::default();
        mock.lock().booking_total = 20.0;
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockApiState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Response for `login`
    #[must_use]
    pub fn with_login(self, response: LoginResponse) -> Self {
        self.lock().login = Some(response);
        self
    }

    /// Catalog contents
    #[must_use]
    pub fn with_spaces(self, spaces: Vec<Space>) -> Self {
        self.lock().spaces = spaces;
        self
    }

    /// Reviews returned with a space's detail
    #[must_use]
    pub fn with_reviews(self, space_id: &str, reviews: Vec<SpaceReview>) -> Self {
        self.lock().reviews.insert(SpaceId::new(space_id), reviews);
        self
    }

    /// Profile of the logged in user
    #[must_use]
    pub fn with_profile(self, profile: Profile) -> Self {
        self.lock().profile = Some(profile);
        self
    }

    /// Bookings returned by both `my_bookings` and `admin_list_bookings`
    #[must_use]
    pub fn with_bookings(self, bookings: Vec<Booking>) -> Self {
        self.lock().bookings = bookings;
        self
    }

    /// Spaces returned by `admin_list_spaces`
    #[must_use]
    pub fn with_admin_spaces(self, spaces: Vec<AdminSpace>) -> Self {
        self.lock().admin_spaces = spaces;
        self
    }

    /// Users returned by `admin_list_users`
    #[must_use]
    pub fn with_users(self, users: Vec<AdminUser>) -> Self {
        self.lock().users = users;
        self
    }

    /// Roles returned by `roles`
    #[must_use]
    pub fn with_roles(self, roles: Vec<Role>) -> Self {
        self.lock().roles = roles;
        self
    }

    /// Total the API "computes" for new bookings
    #[must_use]
    pub fn with_booking_total(self, total: f64) -> Self {
        self.lock().booking_total = total;
        self
    }

    /// Delay every call by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Make `operation` (a trait method name) fail with `error`
    #[must_use]
    pub fn failing(self, operation: &'static str, error: ApiError) -> Self {
        self.lock().failures.insert(operation, error);
        self
    }

    /// Operation names in call order
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    /// How many times `operation` was called
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == operation).count()
    }

    /// Bodies sent to `create_booking`
    #[must_use]
    pub fn created_bookings(&self) -> Vec<NewBooking> {
        self.lock().created_bookings.clone()
    }

    /// Listings sent to `create_space`
    #[must_use]
    pub fn created_spaces(&self) -> Vec<NewSpace> {
        self.lock().created_spaces.clone()
    }

    /// Reviews sent to `submit_review`
    #[must_use]
    pub fn submitted_reviews(&self) -> Vec<(SpaceId, NewReview)> {
        self.lock().submitted_reviews.clone()
    }

    /// `(booking, reference)` pairs sent to `verify_booking`
    #[must_use]
    pub fn verified(&self) -> Vec<(BookingId, String)> {
        self.lock().verified.clone()
    }

    /// Admin space writes; `None` id means create
    #[must_use]
    pub fn admin_space_writes(&self) -> Vec<(Option<SpaceId>, AdminSpaceInput)> {
        self.lock().admin_space_writes.clone()
    }

    /// Admin user writes; `None` id means create
    #[must_use]
    pub fn admin_user_writes(&self) -> Vec<(Option<UserId>, AdminUserInput)> {
        self.lock().admin_user_writes.clone()
    }

    /// Ids passed to the admin delete operations
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    /// Bodies sent to `update_profile`
    #[must_use]
    pub fn profile_updates(&self) -> Vec<ProfileUpdate> {
        self.lock().profile_updates.clone()
    }

    /// Last filter passed to a booking listing
    #[must_use]
    pub fn last_filter(&self) -> Option<BookingFilter> {
        self.lock().last_filter.clone()
    }

    /// Wait out the configured latency, record the call and return the
    /// configured failure, if any
    async fn record(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, MockApiState>, ApiError> {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        state.calls.push(operation);
        match state.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Rejected {
        status: 404,
        message: format!("{what} not found"),
    }
}

fn ack(message: &str) -> Ack {
    Ack {
        message: message.to_string(),
    }
}

#[async_trait]
impl SpacerApi for MockSpacerApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let state = self.record("login").await?;
        state
            .login
            .clone()
            .filter(|login| login.user.email == request.email)
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Created<UserId>, ApiError> {
        let _state = self.record("register").await?;
        Ok(Created {
            message: "User created successfully".to_string(),
            id: UserId::new(format!("user-{}", request.name)),
        })
    }

    async fn list_spaces(&self, query: &SpaceQuery) -> Result<SpacePage, ApiError> {
        let state = self.record("list_spaces").await?;
        let matching: Vec<Space> = state
            .spaces
            .iter()
            .filter(|space| {
                query
                    .space_type
                    .as_ref()
                    .is_none_or(|wanted| &space.space_type == wanted)
            })
            .filter(|space| {
                query.location.as_ref().is_none_or(|location| {
                    space
                        .location
                        .to_lowercase()
                        .contains(&location.to_lowercase())
                })
            })
            .filter(|space| query.min_capacity.is_none_or(|min| space.capacity >= min))
            .filter(|space| {
                query
                    .max_hourly_rate
                    .is_none_or(|max| space.hourly_rate <= max)
            })
            .cloned()
            .collect();

        let per_page = query.per_page.unwrap_or(10).max(1);
        let page = query.page.unwrap_or(1).max(1);
        let total = u32::try_from(matching.len()).unwrap_or(u32::MAX);
        let pages = total.div_ceil(per_page);
        let spaces = matching
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .collect();

        Ok(SpacePage {
            spaces,
            total,
            pages,
            current_page: page,
        })
    }

    async fn get_space(&self, space_id: &SpaceId) -> Result<SpaceDetail, ApiError> {
        let state = self.record("get_space").await?;
        let space = state
            .spaces
            .iter()
            .find(|space| &space.space_id == space_id)
            .cloned()
            .ok_or_else(|| not_found("Space"))?;
        Ok(SpaceDetail {
            reviews: state.reviews.get(space_id).cloned().unwrap_or_default(),
            space,
        })
    }

    async fn create_space(
        &self,
        _token: &str,
        space: NewSpace,
    ) -> Result<Created<SpaceId>, ApiError> {
        let mut state = self.record("create_space").await?;
        state.created_spaces.push(space);
        Ok(Created {
            message: "Space created successfully".to_string(),
            id: SpaceId::new(format!("space-{}", state.created_spaces.len())),
        })
    }

    async fn create_booking(
        &self,
        _token: &str,
        booking: &NewBooking,
    ) -> Result<CreatedBooking, ApiError> {
        let mut state = self.record("create_booking").await?;
        state.created_bookings.push(booking.clone());
        Ok(CreatedBooking {
            message: "Booking created successfully".to_string(),
            booking_id: BookingId::new(format!("booking-{}", state.created_bookings.len())),
            total_amount: state.booking_total,
        })
    }

    async fn verify_booking(
        &self,
        _token: &str,
        booking_id: &BookingId,
        reference: &str,
    ) -> Result<VerifiedBooking, ApiError> {
        let mut state = self.record("verify_booking").await?;
        state
            .verified
            .push((booking_id.clone(), reference.to_string()));
        Ok(VerifiedBooking {
            message: "Booking verified successfully".to_string(),
            payment_id: PaymentId::new(format!("payment-{booking_id}")),
        })
    }

    async fn my_bookings(
        &self,
        _token: &str,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, ApiError> {
        let mut state = self.record("my_bookings").await?;
        state.last_filter = Some(filter.clone());
        Ok(filter_bookings(&state.bookings, filter))
    }

    async fn get_profile(&self, _token: &str) -> Result<Profile, ApiError> {
        let state = self.record("get_profile").await?;
        state
            .profile
            .clone()
            .ok_or_else(|| ApiError::Unauthorized("Token is invalid".to_string()))
    }

    async fn update_profile(&self, _token: &str, update: ProfileUpdate) -> Result<Ack, ApiError> {
        let mut state = self.record("update_profile").await?;
        if let Some(profile) = state.profile.as_mut() {
            profile.username.clone_from(&update.username);
            profile.email.clone_from(&update.email);
        }
        state.profile_updates.push(update);
        Ok(ack("User profile updated successfully"))
    }

    async fn submit_review(
        &self,
        _token: &str,
        space_id: &SpaceId,
        review: &NewReview,
    ) -> Result<Created<String>, ApiError> {
        let mut state = self.record("submit_review").await?;
        state
            .submitted_reviews
            .push((space_id.clone(), review.clone()));
        Ok(Created {
            message: "Review created successfully".to_string(),
            id: format!("review-{}", state.submitted_reviews.len()),
        })
    }

    async fn roles(&self) -> Result<Vec<Role>, ApiError> {
        let state = self.record("roles").await?;
        Ok(state.roles.clone())
    }

    async fn admin_list_spaces(&self, _token: &str) -> Result<Vec<AdminSpace>, ApiError> {
        let state = self.record("admin_list_spaces").await?;
        Ok(state.admin_spaces.clone())
    }

    async fn admin_create_space(
        &self,
        _token: &str,
        space: &AdminSpaceInput,
    ) -> Result<Created<SpaceId>, ApiError> {
        let mut state = self.record("admin_create_space").await?;
        state.admin_space_writes.push((None, space.clone()));
        Ok(Created {
            message: "Space created successfully".to_string(),
            id: SpaceId::new("space-new"),
        })
    }

    async fn admin_update_space(
        &self,
        _token: &str,
        space_id: &SpaceId,
        space: &AdminSpaceInput,
    ) -> Result<Ack, ApiError> {
        let mut state = self.record("admin_update_space").await?;
        state
            .admin_space_writes
            .push((Some(space_id.clone()), space.clone()));
        Ok(ack("Space updated successfully"))
    }

    async fn admin_delete_space(&self, _token: &str, space_id: &SpaceId) -> Result<Ack, ApiError> {
        let mut state = self.record("admin_delete_space").await?;
        state.deleted.push(space_id.to_string());
        state
            .admin_spaces
            .retain(|space| &space.space.space_id != space_id);
        Ok(ack("Space deleted successfully"))
    }

    async fn admin_list_users(&self, _token: &str) -> Result<Vec<AdminUser>, ApiError> {
        let state = self.record("admin_list_users").await?;
        Ok(state.users.clone())
    }

    async fn admin_create_user(
        &self,
        _token: &str,
        user: &AdminUserInput,
    ) -> Result<Created<UserId>, ApiError> {
        let mut state = self.record("admin_create_user").await?;
        state.admin_user_writes.push((None, user.clone()));
        Ok(Created {
            message: "User created successfully".to_string(),
            id: UserId::new("user-new"),
        })
    }

    async fn admin_update_user(
        &self,
        _token: &str,
        user_id: &UserId,
        user: &AdminUserInput,
    ) -> Result<Ack, ApiError> {
        let mut state = self.record("admin_update_user").await?;
        state
            .admin_user_writes
            .push((Some(user_id.clone()), user.clone()));
        Ok(ack("User updated successfully"))
    }

    async fn admin_delete_user(&self, _token: &str, user_id: &UserId) -> Result<Ack, ApiError> {
        let mut state = self.record("admin_delete_user").await?;
        state.deleted.push(user_id.to_string());
        state.users.retain(|user| &user.user_id != user_id);
        Ok(ack("User deleted successfully"))
    }

    async fn admin_list_bookings(
        &self,
        _token: &str,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, ApiError> {
        let mut state = self.record("admin_list_bookings").await?;
        state.last_filter = Some(filter.clone());
        Ok(filter_bookings(&state.bookings, filter))
    }
}

fn filter_bookings(bookings: &[Booking], filter: &BookingFilter) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|booking| filter.status.is_none_or(|status| booking.status == status))
        .filter(|booking| {
            filter
                .start_date
                .is_none_or(|start| booking.start_datetime >= start)
        })
        .filter(|booking| filter.end_date.is_none_or(|end| booking.end_datetime <= end))
        .cloned()
        .collect()
}

#[derive(Default)]
struct MockGatewayState {
    failure: Option<ApiError>,
    latency: Duration,
    requests: Vec<PaymentInit>,
}

/// In-memory [`PaymentGateway`].
///
/// Returns `https://checkout.test/<reference>` as the checkout URL.
#[derive(Clone, Default)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockGatewayState>>,
}

impl MockPaymentGateway {
    /// Create a gateway that accepts every payment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockGatewayState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every initialization fail
    #[must_use]
    pub fn failing(self, error: ApiError) -> Self {
        self.lock().failure = Some(error);
        self
    }

    /// Delay every initialization by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Payments initialized so far
    #[must_use]
    pub fn requests(&self) -> Vec<PaymentInit> {
        self.lock().requests.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initialize(&self, payment: &PaymentInit) -> Result<Checkout, ApiError> {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        state.requests.push(payment.clone());
        if let Some(error) = &state.failure {
            return Err(error.clone());
        }
        Ok(Checkout {
            checkout_url: format!("https://checkout.test/{}", payment.reference),
            reference: payment.reference.clone(),
        })
    }
}
