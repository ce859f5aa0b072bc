//! Wire types for the Spacer REST API.
//!
//! The front-end holds transient copies of these; the API owns and
//! validates them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw identifier
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a space
    SpaceId
);
string_id!(
    /// Unique identifier for a booking
    BookingId
);
string_id!(
    /// Unique identifier for a user
    UserId
);
string_id!(
    /// Unique identifier for a payment record
    PaymentId
);

/// Kind of space, as stored by the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SpaceType {
    /// `teamBuilding`
    TeamBuilding,
    /// `workout`
    Workout,
    /// `garden`
    Garden,
    /// `library`
    Library,
    /// `photography`
    Photography,
    /// `townHouse`
    TownHouse,
    /// Anything the API returns that this client does not know
    Other(String),
}

impl SpaceType {
    /// Types offered in forms and filters
    pub const ALL: [Self; 6] = [
        Self::TeamBuilding,
        Self::Workout,
        Self::Garden,
        Self::Library,
        Self::Photography,
        Self::TownHouse,
    ];

    /// Wire value
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::TeamBuilding => "teamBuilding",
            Self::Workout => "workout",
            Self::Garden => "garden",
            Self::Library => "library",
            Self::Photography => "photography",
            Self::TownHouse => "townHouse",
            Self::Other(raw) => raw,
        }
    }

    /// Human readable label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::TeamBuilding => "Team Building",
            Self::Workout => "Workout",
            Self::Garden => "Garden",
            Self::Library => "Library",
            Self::Photography => "Photography",
            Self::TownHouse => "Town House",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for SpaceType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "teamBuilding" => Self::TeamBuilding,
            "workout" => Self::Workout,
            "garden" => Self::Garden,
            "library" => Self::Library,
            "photography" => Self::Photography,
            "townHouse" => Self::TownHouse,
            _ => Self::Other(raw),
        }
    }
}

impl From<SpaceType> for String {
    fn from(space_type: SpaceType) -> Self {
        match space_type {
            SpaceType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Image attached to a space.
///
/// The catalog returns a `url`, the detail endpoint a bare `filename`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceImage {
    /// Image identifier
    pub image_id: String,
    /// Path or filename of the image
    #[serde(alias = "filename")]
    pub url: String,
}

impl SpaceImage {
    /// Absolute URL of the image, given the API's public origin
    #[must_use]
    pub fn resolve(&self, asset_base: &str) -> String {
        let base = asset_base.trim_end_matches('/');
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            self.url.clone()
        } else if self.url.starts_with('/') {
            format!("{base}{}", self.url)
        } else {
            format!("{base}/static/space_images/{}", self.url)
        }
    }
}

/// A bookable space as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    /// Space identifier
    pub space_id: SpaceId,
    /// Display name
    pub name: String,
    /// Free text description
    #[serde(default)]
    pub description: String,
    /// Address
    pub location: String,
    /// Kind of space
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    /// Price per hour
    pub hourly_rate: f64,
    /// Price per day
    pub day_rate: f64,
    /// Maximum number of people
    pub capacity: u32,
    /// Availability as reported by the API (`available`, ...)
    #[serde(default)]
    pub status: String,
    /// Images
    #[serde(default)]
    pub images: Vec<SpaceImage>,
    /// Mean review rating, 0 when unrated
    #[serde(default)]
    pub average_rating: f64,
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacePage {
    /// Spaces on this page
    pub spaces: Vec<Space>,
    /// Total number of matching spaces
    pub total: u32,
    /// Number of pages
    pub pages: u32,
    /// The page returned (1-based)
    pub current_page: u32,
}

/// A review as shown on a space's detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceReview {
    /// Review identifier
    pub review_id: String,
    /// 1 to 5
    pub rating: u8,
    /// Free text
    pub comment: String,
    /// Author's username
    pub user: String,
    /// When the review was written
    pub created_at: NaiveDateTime,
}

/// A space with its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceDetail {
    /// The space itself
    #[serde(flatten)]
    pub space: Space,
    /// Reviews, newest first as returned by the API
    #[serde(default)]
    pub reviews: Vec<SpaceReview>,
}

/// Query parameters for `GET /spaces`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceQuery {
    /// 1-based page number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Substring match on the address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Exact type match
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub space_type: Option<SpaceType>,
    /// Minimum capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<u32>,
    /// Maximum hourly rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hourly_rate: Option<f64>,
}

/// A file selected in a form, forwarded as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original filename
    pub file_name: String,
    /// MIME type reported by the browser
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// A new listing submitted through "List Your Place".
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpace {
    /// Display name
    pub name: String,
    /// Free text description
    pub description: String,
    /// Address
    pub location: String,
    /// Kind of space
    pub space_type: SpaceType,
    /// Price per hour
    pub hourly_rate: f64,
    /// Price per day
    pub day_rate: f64,
    /// Maximum number of people
    pub capacity: u32,
    /// At least one image
    pub images: Vec<Upload>,
}

/// Generic "created" response carrying an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created<Id> {
    /// Server message
    #[serde(default)]
    pub message: String,
    /// New identifier
    #[serde(alias = "space_id", alias = "user_id", alias = "review_id")]
    pub id: Id,
}

/// Generic acknowledgement (`{"message": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Server message
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Username
    pub name: String,
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
    /// Role assigned to self-registered accounts
    pub role_id: u32,
}

impl RegisterRequest {
    /// Role id the API assigns to ordinary users
    pub const USER_ROLE_ID: u32 = 3;
}

/// The user as described in a login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User identifier
    pub user_id: UserId,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Role label (`admin`, `user`, ...)
    pub role: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token
    pub token: String,
    /// The logged in user
    pub user: AuthUser,
}

/// The logged in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// User identifier
    pub user_id: UserId,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Role label
    #[serde(default)]
    pub role: String,
    /// Avatar path, if one was uploaded
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Multipart body of `PUT /profile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New username
    pub username: String,
    /// New email
    pub email: String,
    /// New avatar
    pub picture: Option<Upload>,
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBooking {
    /// Space to book
    pub space_id: SpaceId,
    /// Start of the reservation
    pub start_datetime: NaiveDateTime,
    /// End of the reservation
    pub end_datetime: NaiveDateTime,
    /// Agreement terms, if the user entered any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

/// Response of `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedBooking {
    /// Server message
    #[serde(default)]
    pub message: String,
    /// New booking
    pub booking_id: BookingId,
    /// Price computed by the API
    pub total_amount: f64,
}

/// Body of `POST /bookings/{id}/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyBooking {
    /// Payment reference round-tripped by the payment provider
    pub reference: String,
}

/// Response of `POST /bookings/{id}/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedBooking {
    /// Server message
    #[serde(default)]
    pub message: String,
    /// Payment recorded for the booking
    pub payment_id: PaymentId,
}

/// Lifecycle of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created, awaiting payment
    Pending,
    /// Paid and verified
    Confirmed,
    /// Took place
    Completed,
    /// Cancelled
    Cancelled,
    /// Anything else the API reports
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    /// Statuses offered in filters
    pub const FILTERABLE: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire value, `None` for unknown input
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::FILTERABLE
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The space a booking refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSpace {
    /// Space identifier
    pub space_id: SpaceId,
    /// Display name
    pub name: String,
    /// Address
    pub location: String,
    /// Kind of space
    #[serde(rename = "type")]
    pub space_type: SpaceType,
}

/// The user a booking belongs to (admin listing only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUser {
    /// User identifier
    pub user_id: UserId,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
}

/// Terms attached to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    /// Whether the agreement was signed
    pub signed: bool,
    /// Agreement text
    pub terms: String,
}

/// A payment recorded against a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Payment identifier
    pub payment_id: PaymentId,
    /// Amount paid
    pub amount: f64,
    /// Provider status (`paid`, ...)
    pub status: String,
    /// Provider name
    pub payment_method: String,
    /// When the payment was recorded
    pub created_at: NaiveDateTime,
}

/// A booking as listed on the profile or in the admin back-office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier
    pub booking_id: BookingId,
    /// Booked space
    pub space: BookingSpace,
    /// Owner, present in admin listings
    #[serde(default)]
    pub user: Option<BookingUser>,
    /// Start of the reservation
    pub start_datetime: NaiveDateTime,
    /// End of the reservation
    pub end_datetime: NaiveDateTime,
    /// Duration as rendered by the API (`"2:00:00"`, `"1 day, 0:00:00"`)
    #[serde(default)]
    pub duration: String,
    /// Price computed by the API
    pub total_amount: f64,
    /// Current status
    pub status: BookingStatus,
    /// When the booking was made
    pub created_at: NaiveDateTime,
    /// Agreement, if any
    #[serde(default)]
    pub agreement: Option<Agreement>,
    /// Payments recorded so far
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
}

impl Booking {
    /// Reviews may only be left for confirmed bookings
    #[must_use]
    pub fn can_review(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// Filters for booking listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    /// Only bookings with this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    /// Bookings starting at or after this time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDateTime>,
    /// Bookings ending at or before this time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BookingList {
    pub(crate) bookings: Vec<Booking>,
}

/// Body of `POST /spaces/{id}/reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    /// 1 to 5
    pub rating: u8,
    /// Free text
    pub comment: String,
}

/// A role as listed by `GET /roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier
    pub role_id: u32,
    /// Role label
    pub role_name: String,
}

/// A space in the admin back-office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSpace {
    /// Catalog fields
    #[serde(flatten)]
    pub space: Space,
    /// Creation time
    pub created_at: NaiveDateTime,
    /// Last update
    pub updated_at: NaiveDateTime,
    /// Number of bookings
    #[serde(default)]
    pub bookings_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminSpaceList {
    pub(crate) spaces: Vec<AdminSpace>,
}

/// JSON body of admin space create/update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminSpaceInput {
    /// Display name
    pub name: String,
    /// Free text description
    pub description: String,
    /// Address
    pub location: String,
    /// Kind of space
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    /// Price per hour
    pub hourly_rate: f64,
    /// Price per day
    pub day_rate: f64,
    /// Maximum number of people
    pub capacity: u32,
    /// Availability (`available`, `unavailable`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A user in the admin back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// User identifier
    pub user_id: UserId,
    /// Username
    pub username: String,
    /// Email
    pub email: String,
    /// Assigned role
    pub role: Role,
    /// Account creation time
    pub created_at: NaiveDateTime,
    /// Number of bookings
    #[serde(default)]
    pub bookings_count: u32,
    /// Number of reviews
    #[serde(default)]
    pub reviews_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminUserList {
    pub(crate) users: Vec<AdminUser>,
}

/// JSON body of admin user create/update.
///
/// On update, fields left `None` are not sent and stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminUserInput {
    /// Username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u32>,
}

/// Format an amount for display (two decimals).
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_space_type_wire_names() {
        let parsed: SpaceType = serde_json::from_value(json!("townHouse")).unwrap();
        assert_eq!(parsed, SpaceType::TownHouse);
        assert_eq!(parsed.label(), "Town House");
        assert_eq!(serde_json::to_value(&parsed).unwrap(), json!("townHouse"));

        let unknown: SpaceType = serde_json::from_value(json!("rooftop")).unwrap();
        assert_eq!(unknown, SpaceType::Other("rooftop".to_string()));
        assert_eq!(serde_json::to_value(&unknown).unwrap(), json!("rooftop"));
    }

    #[test]
    fn test_space_detail_accepts_filename_images() {
        let detail: SpaceDetail = serde_json::from_value(json!({
            "space_id": "s-1",
            "name": "Loft",
            "description": "Bright",
            "location": "Nairobi",
            "type": "photography",
            "hourly_rate": 10.0,
            "day_rate": 60.0,
            "capacity": 8,
            "status": "available",
            "images": [{"image_id": "i-1", "filename": "loft.jpg"}],
            "average_rating": 4.5,
            "reviews": [{
                "review_id": "r-1",
                "rating": 5,
                "comment": "Great light",
                "user": "amina",
                "created_at": "2025-01-02T10:00:00.123456"
            }]
        }))
        .unwrap();

        assert_eq!(detail.space.images[0].url, "loft.jpg");
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.space.space_type, SpaceType::Photography);
    }

    #[test]
    fn test_image_urls_resolve_against_api_origin() {
        let listed = SpaceImage {
            image_id: "i-1".to_string(),
            url: "/static/space_images/loft.jpg".to_string(),
        };
        let detailed = SpaceImage {
            image_id: "i-1".to_string(),
            url: "loft.jpg".to_string(),
        };
        assert_eq!(
            listed.resolve("http://127.0.0.1:5000/"),
            "http://127.0.0.1:5000/static/space_images/loft.jpg"
        );
        assert_eq!(
            detailed.resolve("http://127.0.0.1:5000"),
            "http://127.0.0.1:5000/static/space_images/loft.jpg"
        );
    }

    #[test]
    fn test_booking_status_unknown_and_review_gate() {
        let booking: Booking = serde_json::from_value(json!({
            "booking_id": "b-1",
            "space": {"space_id": "s-1", "name": "Loft", "location": "Nairobi", "type": "garden"},
            "start_datetime": "2025-02-01T10:00:00",
            "end_datetime": "2025-02-01T12:00:00",
            "duration": "2:00:00",
            "total_amount": 20.0,
            "status": "confirmed",
            "created_at": "2025-01-20T09:00:00",
            "agreement": null,
            "payments": []
        }))
        .unwrap();
        assert!(booking.can_review());

        let status: BookingStatus = serde_json::from_value(json!("refunded")).unwrap();
        assert_eq!(status, BookingStatus::Unknown);
        assert_eq!(BookingStatus::parse("Pending"), Some(BookingStatus::Pending));
        assert_eq!(BookingStatus::parse("refunded"), None);
    }

    #[test]
    fn test_created_accepts_named_ids() {
        let created: Created<SpaceId> =
            serde_json::from_value(json!({"message": "Space created successfully", "space_id": "s-9"}))
                .unwrap();
        assert_eq!(created.id.as_str(), "s-9");
    }

    #[test]
    fn test_query_omits_empty_filters() {
        let query = SpaceQuery {
            page: Some(2),
            space_type: Some(SpaceType::Garden),
            ..SpaceQuery::default()
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 2, "type": "garden"})
        );
    }
}
