//! Ready-made API values for tests.
//!
//! Timestamps are fixed relative to [`test_clock`](crate::test_clock)
//! (2025-01-01T00:00:00Z).

use chrono::NaiveDateTime;
use spacer_core::environment::Clock;
use spacer_api::models::{
    AdminSpace, AdminUser, AuthUser, Booking, BookingId, BookingSpace, BookingStatus,
    LoginResponse, PaymentId, PaymentRecord, Profile, Role, Space, SpaceId, SpaceImage,
    SpaceType, UserId,
};

/// The test clock's "now" plus `hours`
#[must_use]
pub fn at_hour(hours: i64) -> NaiveDateTime {
    crate::test_clock().now().naive_utc() + chrono::Duration::hours(hours)
}

/// A garden space with one image
#[must_use]
pub fn space(id: &str, name: &str) -> Space {
    Space {
        space_id: SpaceId::new(id),
        name: name.to_string(),
        description: format!("{name} description"),
        location: "Nairobi".to_string(),
        space_type: SpaceType::Garden,
        hourly_rate: 10.0,
        day_rate: 60.0,
        capacity: 20,
        status: "available".to_string(),
        images: vec![SpaceImage {
            image_id: format!("{id}-img"),
            url: format!("/static/space_images/{id}.jpg"),
        }],
        average_rating: 4.0,
    }
}

/// The admin view of [`space`]
#[must_use]
pub fn admin_space(id: &str, name: &str) -> AdminSpace {
    AdminSpace {
        space: space(id, name),
        created_at: at_hour(-48),
        updated_at: at_hour(-24),
        bookings_count: 2,
    }
}

/// A booking of space `s-1` tomorrow
#[must_use]
pub fn booking(id: &str, status: BookingStatus) -> Booking {
    let payments = if status == BookingStatus::Confirmed {
        vec![PaymentRecord {
            payment_id: PaymentId::new(format!("{id}-payment")),
            amount: 20.0,
            status: "paid".to_string(),
            payment_method: "paystack".to_string(),
            created_at: at_hour(-1),
        }]
    } else {
        Vec::new()
    };

    Booking {
        booking_id: BookingId::new(id),
        space: BookingSpace {
            space_id: SpaceId::new("s-1"),
            name: "Rose Garden".to_string(),
            location: "Nairobi".to_string(),
            space_type: SpaceType::Garden,
        },
        user: None,
        start_datetime: at_hour(24),
        end_datetime: at_hour(26),
        duration: "2:00:00".to_string(),
        total_amount: 20.0,
        status,
        created_at: at_hour(-2),
        agreement: None,
        payments,
    }
}

/// A profile with the given role label
#[must_use]
pub fn profile(role: &str) -> Profile {
    Profile {
        user_id: UserId::new("u-1"),
        username: "amina".to_string(),
        email: "amina@example.com".to_string(),
        role: role.to_string(),
        profile_picture: None,
    }
}

/// A successful login for the given role label
#[must_use]
pub fn login(role: &str) -> LoginResponse {
    LoginResponse {
        token: format!("{role}-token"),
        user: AuthUser {
            user_id: UserId::new("u-1"),
            username: "amina".to_string(),
            email: "amina@example.com".to_string(),
            role: role.to_string(),
        },
    }
}

/// An admin-listed user
#[must_use]
pub fn admin_user(id: &str, username: &str) -> AdminUser {
    AdminUser {
        user_id: UserId::new(id),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role: Role {
            role_id: 3,
            role_name: "user".to_string(),
        },
        created_at: at_hour(-72),
        bookings_count: 1,
        reviews_count: 0,
    }
}
