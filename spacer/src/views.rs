//! Askama page models.
//!
//! Templates only see plain strings, flags and lists. Everything that needs
//! a decision (formatting, which option is selected, whether a button is
//! enabled) is settled here.

use crate::environment::Settings;
use crate::features::admin::{AdminState, AdminTab};
use crate::features::auth::{AuthMode, AuthState};
use crate::features::booking::BookingForm;
use crate::features::catalog::{CatalogState, SpaceDetailState};
use crate::features::listing::ListingState;
use crate::features::profile::ProfileState;
use crate::features::review::ReviewState;
use askama::Template;
use chrono::NaiveDateTime;
use spacer_api::models::{
    AdminSpace, AdminUser, Booking, BookingStatus, PaymentRecord, Role, Space, SpaceDetail,
    SpaceType, format_amount,
};
use spacer_web::Session;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

fn display_time(at: NaiveDateTime) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

/// Navigation bar flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Nav {
    /// Show Profile and Logout
    pub logged_in: bool,
    /// Show Admin
    pub is_admin: bool,
}

impl Nav {
    /// Flags for the given session
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            logged_in: session.is_authenticated(),
            is_admin: session.is_admin(),
        }
    }

    /// Flags for a request that already passed an auth extractor
    #[must_use]
    pub const fn signed_in(is_admin: bool) -> Self {
        Self {
            logged_in: true,
            is_admin,
        }
    }
}

/// An `<option>` in a `<select>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value
    pub value: String,
    /// Shown text
    pub label: String,
    /// Pre-selected
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        Self {
            selected: value == current,
            label: label.into(),
            value,
        }
    }
}

fn type_options(current: &str, placeholder: &str) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", placeholder, current))
        .chain(
            SpaceType::ALL
                .iter()
                .map(|t| SelectOption::new(t.as_str(), t.label(), current)),
        )
        .collect()
}

fn status_options(current: &str) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", "All statuses", current))
        .chain(
            BookingStatus::FILTERABLE
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.as_str(), current)),
        )
        .collect()
}

/// Home page
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    /// Navigation
    pub nav: Nav,
}

/// About Us page
#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutPage {
    /// Navigation
    pub nav: Nav,
}

/// Blocking alert page (payment verification failures and the like)
#[derive(Template)]
#[template(path = "alert.html")]
pub struct AlertPage {
    /// Navigation
    pub nav: Nav,
    /// Heading
    pub title: String,
    /// Alert text
    pub message: String,
}

/// Login / register page
#[derive(Template)]
#[template(path = "login.html")]
pub struct AuthPage {
    /// Navigation
    pub nav: Nav,
    /// Show the register form instead of login
    pub register: bool,
    /// Email echo
    pub email: String,
    /// Name echo
    pub name: String,
    /// Validation messages
    pub errors: Vec<String>,
    /// Failure alert
    pub alert: Option<String>,
    /// Success notice
    pub notice: Option<String>,
}

impl AuthPage {
    /// Page for an auth flow state
    #[must_use]
    pub fn new(nav: Nav, state: &AuthState) -> Self {
        Self {
            nav,
            register: state.mode == AuthMode::Register,
            email: state.email.clone(),
            name: state.name.clone(),
            errors: state.errors.clone(),
            alert: state.alert.clone(),
            notice: state.notice.clone(),
        }
    }
}

/// A catalog card.
#[derive(Clone, Debug)]
pub struct SpaceCard {
    /// Detail link
    pub href: String,
    /// Display name
    pub name: String,
    /// Address
    pub location: String,
    /// Type label
    pub type_label: String,
    /// Hourly rate
    pub hourly_rate: String,
    /// Day rate
    pub day_rate: String,
    /// Capacity
    pub capacity: u32,
    /// Average rating, one decimal
    pub rating: String,
    /// First image
    pub image: Option<String>,
}

impl SpaceCard {
    fn new(space: &Space, settings: &Settings) -> Self {
        Self {
            href: format!("/spaces/{}", space.space_id),
            name: space.name.clone(),
            location: space.location.clone(),
            type_label: space.space_type.label().to_string(),
            hourly_rate: format_amount(space.hourly_rate),
            day_rate: format_amount(space.day_rate),
            capacity: space.capacity,
            rating: format!("{:.1}", space.average_rating),
            image: space
                .images
                .first()
                .map(|image| image.resolve(&settings.asset_base)),
        }
    }
}

/// A numbered pagination button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    /// Page number
    pub number: u32,
    /// Link to that page
    pub href: String,
    /// The page being shown
    pub current: bool,
}

/// "Find a Place"
#[derive(Template)]
#[template(path = "catalog.html")]
pub struct CatalogPage {
    /// Navigation
    pub nav: Nav,
    /// Cards on this page
    pub cards: Vec<SpaceCard>,
    /// Failure alert
    pub alert: Option<String>,
    /// Location filter echo
    pub location: String,
    /// Type filter options
    pub types: Vec<SelectOption>,
    /// Capacity filter echo
    pub min_capacity: String,
    /// Rate filter echo
    pub max_hourly_rate: String,
    /// Name search echo
    pub q: String,
    /// Total matches
    pub total: u32,
    /// One button per page
    pub page_links: Vec<PageLink>,
    /// "Previous" link, `None` on the first page
    pub previous_href: Option<String>,
    /// "Next" link, `None` on the last page
    pub next_href: Option<String>,
}

impl CatalogPage {
    /// Page for a catalog state
    #[must_use]
    pub fn new(nav: Nav, state: &CatalogState, settings: &Settings) -> Self {
        let filters = &state.filters;
        let current_type = filters
            .space_type
            .as_ref()
            .map_or("", SpaceType::as_str)
            .to_string();

        let page_href = |page: u32| {
            let mut params = vec![("page".to_string(), page.to_string())];
            if let Some(location) = &filters.location {
                params.push(("location".to_string(), location.clone()));
            }
            if !current_type.is_empty() {
                params.push(("type".to_string(), current_type.clone()));
            }
            if let Some(min) = filters.min_capacity {
                params.push(("min_capacity".to_string(), min.to_string()));
            }
            if let Some(max) = filters.max_hourly_rate {
                params.push(("max_hourly_rate".to_string(), max.to_string()));
            }
            if let Some(q) = &filters.search {
                params.push(("q".to_string(), q.clone()));
            }
            reqwest::Url::parse_with_params("http://spacer.local/spaces", &params)
                .map_or_else(|_| "/spaces".to_string(), |url| {
                    format!("{}?{}", url.path(), url.query().unwrap_or_default())
                })
        };

        Self {
            nav,
            cards: state
                .spaces
                .iter()
                .map(|space| SpaceCard::new(space, settings))
                .collect(),
            alert: state.alert.clone(),
            location: filters.location.clone().unwrap_or_default(),
            types: type_options(&current_type, "All types"),
            min_capacity: filters.min_capacity.map(|c| c.to_string()).unwrap_or_default(),
            max_hourly_rate: filters
                .max_hourly_rate
                .map(|r| r.to_string())
                .unwrap_or_default(),
            q: filters.search.clone().unwrap_or_default(),
            total: state.total,
            page_links: (1..=state.pages)
                .map(|number| PageLink {
                    number,
                    href: page_href(number),
                    current: number == state.current_page,
                })
                .collect(),
            previous_href: state
                .has_previous()
                .then(|| page_href(state.current_page - 1)),
            next_href: state.has_next().then(|| page_href(state.current_page + 1)),
        }
    }
}

/// A review line on a space page.
#[derive(Clone, Debug)]
pub struct ReviewLine {
    /// Author
    pub user: String,
    /// 1 to 5
    pub rating: u8,
    /// Free text
    pub comment: String,
    /// When it was written
    pub date: String,
}

/// The booking dialog as rendered.
#[derive(Clone, Debug, Default)]
pub struct BookingDialog {
    /// Start echo
    pub start: String,
    /// End echo
    pub end: String,
    /// Terms echo
    pub terms: String,
    /// Validation messages
    pub errors: Vec<String>,
    /// Failure alert (booking or payment)
    pub alert: Option<String>,
    /// Whether the submit button is enabled
    pub can_submit: bool,
}

impl BookingDialog {
    /// Dialog echoing `form`
    #[must_use]
    pub fn new(form: &BookingForm, errors: Vec<String>, alert: Option<String>, can_submit: bool) -> Self {
        Self {
            start: form.start.clone(),
            end: form.end.clone(),
            terms: form.terms.clone(),
            errors,
            alert,
            can_submit,
        }
    }
}

/// Space detail page with the booking dialog
#[derive(Template)]
#[template(path = "space_detail.html")]
pub struct SpaceDetailPage {
    /// Navigation
    pub nav: Nav,
    /// Space id
    pub space_id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Address
    pub location: String,
    /// Type label
    pub type_label: String,
    /// Hourly rate
    pub hourly_rate: String,
    /// Day rate
    pub day_rate: String,
    /// Capacity
    pub capacity: u32,
    /// Availability
    pub status: String,
    /// Average rating
    pub rating: String,
    /// Image URLs
    pub images: Vec<String>,
    /// Reviews
    pub reviews: Vec<ReviewLine>,
    /// Booking dialog
    pub dialog: BookingDialog,
}

impl SpaceDetailPage {
    /// Page for a loaded space
    #[must_use]
    pub fn new(nav: Nav, detail: &SpaceDetail, dialog: BookingDialog, settings: &Settings) -> Self {
        let space = &detail.space;
        Self {
            nav,
            space_id: space.space_id.to_string(),
            name: space.name.clone(),
            description: space.description.clone(),
            location: space.location.clone(),
            type_label: space.space_type.label().to_string(),
            hourly_rate: format_amount(space.hourly_rate),
            day_rate: format_amount(space.day_rate),
            capacity: space.capacity,
            status: space.status.clone(),
            rating: format!("{:.1}", space.average_rating),
            images: space
                .images
                .iter()
                .map(|image| image.resolve(&settings.asset_base))
                .collect(),
            reviews: detail
                .reviews
                .iter()
                .map(|review| ReviewLine {
                    user: review.user.clone(),
                    rating: review.rating,
                    comment: review.comment.clone(),
                    date: review.created_at.format("%Y-%m-%d").to_string(),
                })
                .collect(),
            dialog,
        }
    }

    /// Page for a detail flow state, `None` if nothing was loaded
    #[must_use]
    pub fn from_state(
        nav: Nav,
        state: &SpaceDetailState,
        dialog: BookingDialog,
        settings: &Settings,
    ) -> Option<Self> {
        state
            .detail
            .as_ref()
            .map(|detail| Self::new(nav, detail, dialog, settings))
    }
}

/// "List Your Place"
#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingPage {
    /// Navigation
    pub nav: Nav,
    /// Name echo
    pub name: String,
    /// Type options
    pub types: Vec<SelectOption>,
    /// Description echo
    pub description: String,
    /// Hourly rate echo
    pub hourly_rate: String,
    /// Day rate echo
    pub day_rate: String,
    /// Capacity echo
    pub capacity: String,
    /// Address echo
    pub location: String,
    /// Name error
    pub name_error: Option<String>,
    /// Type error
    pub type_error: Option<String>,
    /// Description error
    pub description_error: Option<String>,
    /// Hourly rate error
    pub hourly_rate_error: Option<String>,
    /// Day rate error
    pub day_rate_error: Option<String>,
    /// Capacity error
    pub capacity_error: Option<String>,
    /// Address error
    pub location_error: Option<String>,
    /// Images error
    pub images_error: Option<String>,
    /// Failure alert
    pub alert: Option<String>,
    /// Success notice
    pub notice: Option<String>,
}

impl ListingPage {
    /// Page for a listing flow state
    #[must_use]
    pub fn new(nav: Nav, state: &ListingState) -> Self {
        let form = &state.form;
        let errors = state.errors.clone();
        Self {
            nav,
            name: form.name.clone(),
            types: type_options(&form.space_type, "Select a type"),
            description: form.description.clone(),
            hourly_rate: form.hourly_rate.clone(),
            day_rate: form.day_rate.clone(),
            capacity: form.capacity.clone(),
            location: form.location.clone(),
            name_error: errors.name,
            type_error: errors.space_type,
            description_error: errors.description,
            hourly_rate_error: errors.hourly_rate,
            day_rate_error: errors.day_rate,
            capacity_error: errors.capacity,
            location_error: errors.location,
            images_error: errors.images,
            alert: state.alert.clone(),
            notice: state.notice.clone(),
        }
    }
}

/// A payment listed under a booking.
#[derive(Clone, Debug)]
pub struct PaymentRow {
    /// Provider name
    pub method: String,
    /// Amount paid
    pub amount: String,
    /// Provider status
    pub status: String,
    /// Badge style: `success` for completed payments, `muted` otherwise
    pub badge: &'static str,
}

impl From<&PaymentRecord> for PaymentRow {
    fn from(payment: &PaymentRecord) -> Self {
        let completed = ["completed", "paid", "success"]
            .iter()
            .any(|done| payment.status.eq_ignore_ascii_case(done));
        Self {
            method: payment.payment_method.clone(),
            amount: format_amount(payment.amount),
            status: payment.status.clone(),
            badge: if completed { "success" } else { "muted" },
        }
    }
}

/// A booking row on the profile or in the admin table.
#[derive(Clone, Debug)]
pub struct BookingRow {
    /// Booking id
    pub id: String,
    /// Booked space
    pub space_name: String,
    /// Space address
    pub location: String,
    /// Owner (admin only)
    pub user: Option<String>,
    /// Owner's email (admin only)
    pub user_email: Option<String>,
    /// Start
    pub start: String,
    /// End
    pub end: String,
    /// Duration as rendered by the API
    pub duration: String,
    /// Total price
    pub total: String,
    /// Status label
    pub status: String,
    /// When the booking was made
    pub created: String,
    /// `Signed` / `Not signed`, `None` without an agreement
    pub agreement: Option<&'static str>,
    /// Payments recorded so far
    pub payments: Vec<PaymentRow>,
    /// "Leave a Review" link, confirmed bookings only
    pub review_href: Option<String>,
    /// Admin details link
    pub detail_href: String,
}

impl BookingRow {
    fn new(booking: &Booking) -> Self {
        Self {
            id: booking.booking_id.to_string(),
            space_name: booking.space.name.clone(),
            location: booking.space.location.clone(),
            user: booking.user.as_ref().map(|user| user.username.clone()),
            user_email: booking.user.as_ref().map(|user| user.email.clone()),
            start: display_time(booking.start_datetime),
            end: display_time(booking.end_datetime),
            duration: booking.duration.clone(),
            total: format_amount(booking.total_amount),
            status: booking.status.to_string(),
            created: display_time(booking.created_at),
            agreement: booking
                .agreement
                .as_ref()
                .map(|agreement| if agreement.signed { "Signed" } else { "Not signed" }),
            payments: booking.payments.iter().map(PaymentRow::from).collect(),
            review_href: booking
                .can_review()
                .then(|| format!("/bookings/{}/review", booking.booking_id)),
            detail_href: format!("/admin?tab=bookings&view={}", booking.booking_id),
        }
    }
}

/// Profile page
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    /// Navigation
    pub nav: Nav,
    /// Whether the profile loaded
    pub loaded: bool,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Role label
    pub role: String,
    /// Avatar URL
    pub picture: Option<String>,
    /// Profile fetch failure
    pub profile_error: Option<String>,
    /// Bookings fetch failure
    pub bookings_error: Option<String>,
    /// Bookings
    pub bookings: Vec<BookingRow>,
    /// Status filter options
    pub statuses: Vec<SelectOption>,
    /// Update form: username echo
    pub form_username: String,
    /// Update form: email echo
    pub form_email: String,
    /// Update form messages
    pub form_errors: Vec<String>,
    /// Success notice
    pub notice: Option<String>,
    /// Failure alert
    pub alert: Option<String>,
}

impl ProfilePage {
    /// Page for a profile flow state, with an optional hand-over notice
    #[must_use]
    pub fn new(nav: Nav, state: &ProfileState, notice: Option<&str>, settings: &Settings) -> Self {
        let profile = state.profile.as_ref();
        let current_status = state.status_filter.map_or("", BookingStatus::as_str);
        Self {
            nav,
            loaded: profile.is_some(),
            username: profile.map(|p| p.username.clone()).unwrap_or_default(),
            email: profile.map(|p| p.email.clone()).unwrap_or_default(),
            role: profile.map(|p| p.role.clone()).unwrap_or_default(),
            picture: profile
                .and_then(|p| p.profile_picture.as_deref())
                .map(|path| {
                    if path.starts_with("http://") || path.starts_with("https://") {
                        path.to_string()
                    } else {
                        format!(
                            "{}/{}",
                            settings.asset_base.trim_end_matches('/'),
                            path.trim_start_matches('/')
                        )
                    }
                }),
            profile_error: state.profile_error.clone(),
            bookings_error: state.bookings_error.clone(),
            bookings: state.bookings.iter().map(BookingRow::new).collect(),
            statuses: status_options(current_status),
            form_username: state.form.username.clone(),
            form_email: state.form.email.clone(),
            form_errors: state.form_errors.clone(),
            notice: state
                .notice
                .clone()
                .or_else(|| notice.map(str::to_string)),
            alert: state.alert.clone(),
        }
    }
}

/// "Leave a Review"
#[derive(Template)]
#[template(path = "review.html")]
pub struct ReviewPage {
    /// Navigation
    pub nav: Nav,
    /// Booking under review
    pub booking_id: String,
    /// Booked space
    pub space_name: Option<String>,
    /// Whether the form is shown at all
    pub reviewable: bool,
    /// Rating options 1..=5
    pub ratings: Vec<SelectOption>,
    /// Comment echo
    pub comment: String,
    /// Validation messages
    pub errors: Vec<String>,
    /// Whether the submit button is enabled
    pub can_submit: bool,
    /// Failure alert
    pub alert: Option<String>,
}

impl ReviewPage {
    /// Page for a review flow state
    #[must_use]
    pub fn new(nav: Nav, state: &ReviewState) -> Self {
        let current = state.form.rating.trim();
        Self {
            nav,
            booking_id: state
                .booking_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            space_name: state.booking.as_ref().map(|b| b.space.name.clone()),
            reviewable: state.reviewable(),
            ratings: std::iter::once(SelectOption::new("", "Select a rating", current))
                .chain((1..=5).map(|n: u8| SelectOption::new(n.to_string(), "★".repeat(n.into()), current)))
                .collect(),
            comment: state.form.comment.clone(),
            errors: state.errors.clone(),
            can_submit: state.can_submit,
            alert: state.alert.clone(),
        }
    }
}

/// A tab link in the back-office.
#[derive(Clone, Debug)]
pub struct TabLink {
    /// Target
    pub href: String,
    /// Label
    pub label: &'static str,
    /// Currently shown
    pub active: bool,
}

/// A space row in the back-office.
#[derive(Clone, Debug)]
pub struct AdminSpaceRow {
    /// Space id
    pub id: String,
    /// Display name
    pub name: String,
    /// Address
    pub location: String,
    /// Type label
    pub type_label: String,
    /// Hourly rate
    pub hourly_rate: String,
    /// Capacity
    pub capacity: u32,
    /// Availability
    pub status: String,
    /// Number of bookings
    pub bookings: u32,
}

impl From<&AdminSpace> for AdminSpaceRow {
    fn from(admin: &AdminSpace) -> Self {
        let space = &admin.space;
        Self {
            id: space.space_id.to_string(),
            name: space.name.clone(),
            location: space.location.clone(),
            type_label: space.space_type.label().to_string(),
            hourly_rate: format_amount(space.hourly_rate),
            capacity: space.capacity,
            status: space.status.clone(),
            bookings: admin.bookings_count,
        }
    }
}

/// A user row in the back-office.
#[derive(Clone, Debug)]
pub struct AdminUserRow {
    /// User id
    pub id: String,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Role label
    pub role: String,
    /// Number of bookings
    pub bookings: u32,
    /// Number of reviews
    pub reviews: u32,
    /// Account creation date
    pub created: String,
}

impl From<&AdminUser> for AdminUserRow {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.user_id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.role_name.clone(),
            bookings: user.bookings_count,
            reviews: user.reviews_count,
            created: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

fn role_options(roles: &[Role], current: &str) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new("", "Select a role", current))
        .chain(
            roles
                .iter()
                .map(|role| SelectOption::new(role.role_id.to_string(), role.role_name.clone(), current)),
        )
        .collect()
}

/// Admin back-office
#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminPage {
    /// Navigation
    pub nav: Nav,
    /// Tab links
    pub tabs: Vec<TabLink>,
    /// Spaces tab shown
    pub show_spaces: bool,
    /// Users tab shown
    pub show_users: bool,
    /// Bookings tab shown
    pub show_bookings: bool,
    /// Listing failure
    pub load_error: Option<String>,
    /// Mutation success
    pub notice: Option<String>,
    /// Mutation failure
    pub alert: Option<String>,
    /// Space rows
    pub spaces: Vec<AdminSpaceRow>,
    /// Registered users (shown on the spaces tab)
    pub user_count: usize,
    /// Form action for the space form
    pub space_action: String,
    /// Whether the space form edits an existing space
    pub editing_space: bool,
    /// Space form: name
    pub space_name: String,
    /// Space form: description
    pub space_description: String,
    /// Space form: address
    pub space_location: String,
    /// Space form: type options
    pub space_types: Vec<SelectOption>,
    /// Space form: hourly rate
    pub space_hourly_rate: String,
    /// Space form: day rate
    pub space_day_rate: String,
    /// Space form: capacity
    pub space_capacity: String,
    /// Space form: availability
    pub space_status: String,
    /// Space form messages
    pub space_errors: Vec<String>,
    /// User rows
    pub users: Vec<AdminUserRow>,
    /// Form action for the user form
    pub user_action: String,
    /// Whether the user form edits an existing user
    pub editing_user: bool,
    /// User form: username
    pub user_username: String,
    /// User form: email
    pub user_email: String,
    /// User form: role options
    pub user_roles: Vec<SelectOption>,
    /// User form messages
    pub user_errors: Vec<String>,
    /// Booking rows
    pub bookings: Vec<BookingRow>,
    /// Booking whose details are open
    pub selected_booking: Option<BookingRow>,
    /// Bookings filter: status options
    pub statuses: Vec<SelectOption>,
    /// Bookings filter: start echo
    pub filter_start: String,
    /// Bookings filter: end echo
    pub filter_end: String,
}

impl AdminPage {
    /// Page for a back-office state
    #[must_use]
    pub fn new(nav: Nav, state: &AdminState) -> Self {
        let space_form = &state.space_form;
        let user_form = &state.user_form;
        Self {
            nav,
            tabs: AdminTab::ALL
                .into_iter()
                .map(|tab| TabLink {
                    href: format!("/admin?tab={}", tab.as_str()),
                    label: tab.label(),
                    active: tab == state.tab,
                })
                .collect(),
            show_spaces: state.tab == AdminTab::Spaces,
            show_users: state.tab == AdminTab::Users,
            show_bookings: state.tab == AdminTab::Bookings,
            load_error: state.load_error.clone(),
            notice: state.notice.clone(),
            alert: state.alert.clone(),
            spaces: state.spaces.iter().map(AdminSpaceRow::from).collect(),
            user_count: state.users.len(),
            space_action: state.editing_space.as_ref().map_or_else(
                || "/admin/spaces".to_string(),
                |id| format!("/admin/spaces/{id}"),
            ),
            editing_space: state.editing_space.is_some(),
            space_name: space_form.name.clone(),
            space_description: space_form.description.clone(),
            space_location: space_form.location.clone(),
            space_types: type_options(&space_form.space_type, "Select a type"),
            space_hourly_rate: space_form.hourly_rate.clone(),
            space_day_rate: space_form.day_rate.clone(),
            space_capacity: space_form.capacity.clone(),
            space_status: space_form.status.clone(),
            space_errors: state.space_errors.clone(),
            users: state.users.iter().map(AdminUserRow::from).collect(),
            user_action: state.editing_user.as_ref().map_or_else(
                || "/admin/users".to_string(),
                |id| format!("/admin/users/{id}"),
            ),
            editing_user: state.editing_user.is_some(),
            user_username: user_form.username.clone(),
            user_email: user_form.email.clone(),
            user_roles: role_options(&state.roles, user_form.role_id.trim()),
            user_errors: state.user_errors.clone(),
            bookings: state.bookings.iter().map(BookingRow::new).collect(),
            selected_booking: state.viewing_booking.as_ref().and_then(|id| {
                state
                    .bookings
                    .iter()
                    .find(|booking| &booking.booking_id == id)
                    .map(BookingRow::new)
            }),
            statuses: status_options(&state.filter.status.trim().to_lowercase()),
            filter_start: state.filter.start_date.clone(),
            filter_end: state.filter.end_date.clone(),
        }
    }
}
