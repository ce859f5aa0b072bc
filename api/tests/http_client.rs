//! HTTP client tests against a mocked Spacer API and payment provider.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use spacer_api::models::{
    BookingFilter, BookingId, BookingStatus, LoginRequest, NewBooking, NewReview, SpaceId,
    SpaceQuery, SpaceType,
};
use spacer_api::{ApiError, HttpSpacerApi, PaymentGateway, PaymentInit, PaystackGateway, SpacerApi};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn datetime(raw: &str) -> chrono::NaiveDateTime {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").unwrap()
}

#[tokio::test]
async fn test_login_returns_token_and_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "amina@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-token",
            "user": {
                "user_id": "u-1",
                "username": "amina",
                "email": "amina@example.com",
                "role": "admin"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let response = api
        .login(&LoginRequest {
            email: "amina@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.token, "jwt-token");
    assert_eq!(response.user.role, "admin");
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let err = api
        .login(&LoginRequest {
            email: "amina@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Unauthorized("Invalid credentials".to_string()));
}

#[tokio::test]
async fn test_list_spaces_sends_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spaces"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "6"))
        .and(query_param("type", "garden"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spaces": [{
                "space_id": "s-1",
                "name": "Rose Garden",
                "description": "Quiet",
                "location": "Karen",
                "type": "garden",
                "hourly_rate": 12.5,
                "day_rate": 80,
                "capacity": 40,
                "status": "available",
                "images": [{"image_id": "i-1", "url": "/static/space_images/rose.jpg"}],
                "average_rating": 0
            }],
            "total": 7,
            "pages": 2,
            "current_page": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let page = api
        .list_spaces(&SpaceQuery {
            page: Some(2),
            per_page: Some(6),
            space_type: Some(SpaceType::Garden),
            ..SpaceQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(page.current_page, 2);
    assert_eq!(page.spaces[0].name, "Rose Garden");
    assert!((page.spaces[0].day_rate - 80.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_create_booking_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(body_json(json!({
            "space_id": "s-1",
            "start_datetime": "2025-03-01T10:00:00",
            "end_datetime": "2025-03-01T12:00:00"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Booking created successfully",
            "booking_id": "b-1",
            "total_amount": 25.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let created = api
        .create_booking(
            "jwt-token",
            &NewBooking {
                space_id: SpaceId::new("s-1"),
                start_datetime: datetime("2025-03-01T10:00:00"),
                end_datetime: datetime("2025-03-01T12:00:00"),
                terms: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.booking_id, BookingId::new("b-1"));
}

#[tokio::test]
async fn test_booking_conflict_is_rejected_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Space is already booked for this time period"
        })))
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let err = api
        .create_booking(
            "jwt-token",
            &NewBooking {
                space_id: SpaceId::new("s-1"),
                start_datetime: datetime("2025-03-01T10:00:00"),
                end_datetime: datetime("2025-03-01T12:00:00"),
                terms: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Space is already booked for this time period");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_verify_booking_posts_reference() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings/b-1/verify"))
        .and(body_json(json!({"reference": "spacer-b-1-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Booking verified successfully",
            "payment_id": "p-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let verified = api
        .verify_booking("jwt-token", &BookingId::new("b-1"), "spacer-b-1-1")
        .await
        .unwrap();

    assert_eq!(verified.payment_id.as_str(), "p-1");
}

#[tokio::test]
async fn test_my_bookings_unwraps_list_and_filters_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/my-bookings"))
        .and(query_param("status", "confirmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bookings": [{
                "booking_id": "b-1",
                "space": {"space_id": "s-1", "name": "Loft", "location": "CBD", "type": "library"},
                "start_datetime": "2025-03-01T10:00:00",
                "end_datetime": "2025-03-01T12:00:00",
                "duration": "2:00:00",
                "total_amount": 25.0,
                "status": "confirmed",
                "created_at": "2025-02-20T08:00:00",
                "agreement": {"signed": true, "terms": "Default terms and conditions"},
                "payments": [{
                    "payment_id": "p-1",
                    "amount": 25.0,
                    "status": "paid",
                    "payment_method": "paystack",
                    "created_at": "2025-02-20T08:05:00"
                }]
            }]
        })))
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let bookings = api
        .my_bookings(
            "jwt-token",
            &BookingFilter {
                status: Some(BookingStatus::Confirmed),
                ..BookingFilter::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(bookings.len(), 1);
    assert!(bookings[0].can_review());
    assert_eq!(bookings[0].payments[0].payment_method, "paystack");
}

#[tokio::test]
async fn test_duplicate_review_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/spaces/s-1/reviews"))
        .and(body_json(json!({"rating": 4, "comment": "Nice"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "You have already reviewed this space"
        })))
        .mount(&server)
        .await;

    let api = HttpSpacerApi::new(server.uri());
    let err = api
        .submit_review(
            "jwt-token",
            &SpaceId::new("s-1"),
            &NewReview {
                rating: 4,
                comment: "Nice".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "You have already reviewed this space");
}

#[tokio::test]
async fn test_transport_failure_is_request_failed() {
    // Nothing listens on port 9 (discard) in the test environment
    let api = HttpSpacerApi::new("http://127.0.0.1:9");
    let err = api.roles().await.unwrap_err();
    assert!(matches!(err, ApiError::RequestFailed(_)));
}

fn payment() -> PaymentInit {
    PaymentInit {
        email: "amina@example.com".to_string(),
        amount: 25.5,
        currency: "KES".to_string(),
        reference: "spacer-b-1-1735689600000".to_string(),
        callback_url: "http://localhost:3000/checkout/return?reference=spacer-b-1-1735689600000&booking_id=b-1"
            .to_string(),
        booking_id: BookingId::new("b-1"),
    }
}

#[tokio::test]
async fn test_paystack_initialize_returns_checkout_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .and(header("authorization", "Bearer sk_test"))
        .and(body_json(json!({
            "email": "amina@example.com",
            "amount": 2550,
            "reference": "spacer-b-1-1735689600000",
            "currency": "KES",
            "callback_url": "http://localhost:3000/checkout/return?reference=spacer-b-1-1735689600000&booking_id=b-1",
            "metadata": {"booking_id": "b-1"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Authorization URL created",
            "data": {
                "authorization_url": "https://checkout.paystack.com/abc",
                "access_code": "abc",
                "reference": "spacer-b-1-1735689600000"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = PaystackGateway::new(server.uri(), "sk_test");
    let checkout = gateway.initialize(&payment()).await.unwrap();

    assert_eq!(checkout.checkout_url, "https://checkout.paystack.com/abc");
    assert_eq!(checkout.reference, "spacer-b-1-1735689600000");
}

#[tokio::test]
async fn test_paystack_refusal_is_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": false,
            "message": "Invalid key"
        })))
        .mount(&server)
        .await;

    let gateway = PaystackGateway::new(server.uri(), "sk_wrong");
    let err = gateway.initialize(&payment()).await.unwrap_err();

    assert_eq!(err, ApiError::Gateway("Invalid key".to_string()));
}
