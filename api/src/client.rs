//! The Spacer REST API: trait and reqwest implementation.

use crate::error::ApiError;
use crate::models::{
    Ack, AdminSpace, AdminSpaceInput, AdminSpaceList, AdminUser, AdminUserInput, AdminUserList,
    Booking, BookingFilter, BookingId, BookingList, Created, CreatedBooking, LoginRequest,
    LoginResponse, NewBooking, NewReview, NewSpace, Profile, ProfileUpdate, RegisterRequest,
    Role, SpaceDetail, SpaceId, SpacePage, SpaceQuery, Upload, UserId, VerifiedBooking,
    VerifyBooking,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Every backend call the front-end makes.
///
/// Methods taking a `token` send it as `Authorization: Bearer <token>`.
/// Implementations must not retry; a failed call is reported once.
#[async_trait]
pub trait SpacerApi: Send + Sync {
    /// `POST /auth/login`
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;

    /// `POST /auth/register`
    async fn register(&self, request: &RegisterRequest) -> Result<Created<UserId>, ApiError>;

    /// `GET /spaces`
    async fn list_spaces(&self, query: &SpaceQuery) -> Result<SpacePage, ApiError>;

    /// `GET /spaces/{id}`
    async fn get_space(&self, space_id: &SpaceId) -> Result<SpaceDetail, ApiError>;

    /// `POST /spaces` (multipart)
    async fn create_space(&self, token: &str, space: NewSpace)
    -> Result<Created<SpaceId>, ApiError>;

    /// `POST /bookings`
    async fn create_booking(
        &self,
        token: &str,
        booking: &NewBooking,
    ) -> Result<CreatedBooking, ApiError>;

    /// `POST /bookings/{id}/verify`
    async fn verify_booking(
        &self,
        token: &str,
        booking_id: &BookingId,
        reference: &str,
    ) -> Result<VerifiedBooking, ApiError>;

    /// `GET /bookings/my-bookings`
    async fn my_bookings(&self, token: &str, filter: &BookingFilter)
    -> Result<Vec<Booking>, ApiError>;

    /// `GET /profile`
    async fn get_profile(&self, token: &str) -> Result<Profile, ApiError>;

    /// `PUT /profile` (multipart)
    async fn update_profile(&self, token: &str, update: ProfileUpdate) -> Result<Ack, ApiError>;

    /// `POST /spaces/{id}/reviews`
    async fn submit_review(
        &self,
        token: &str,
        space_id: &SpaceId,
        review: &NewReview,
    ) -> Result<Created<String>, ApiError>;

    /// `GET /roles`
    async fn roles(&self) -> Result<Vec<Role>, ApiError>;

    /// `GET /admin/spaces`
    async fn admin_list_spaces(&self, token: &str) -> Result<Vec<AdminSpace>, ApiError>;

    /// `POST /admin/spaces`
    async fn admin_create_space(
        &self,
        token: &str,
        space: &AdminSpaceInput,
    ) -> Result<Created<SpaceId>, ApiError>;

    /// `PUT /admin/spaces/{id}`
    async fn admin_update_space(
        &self,
        token: &str,
        space_id: &SpaceId,
        space: &AdminSpaceInput,
    ) -> Result<Ack, ApiError>;

    /// `DELETE /admin/spaces/{id}`
    async fn admin_delete_space(&self, token: &str, space_id: &SpaceId) -> Result<Ack, ApiError>;

    /// `GET /admin/users`
    async fn admin_list_users(&self, token: &str) -> Result<Vec<AdminUser>, ApiError>;

    /// `POST /admin/users`
    async fn admin_create_user(
        &self,
        token: &str,
        user: &AdminUserInput,
    ) -> Result<Created<UserId>, ApiError>;

    /// `PUT /admin/users/{id}`
    async fn admin_update_user(
        &self,
        token: &str,
        user_id: &UserId,
        user: &AdminUserInput,
    ) -> Result<Ack, ApiError>;

    /// `DELETE /admin/users/{id}`
    async fn admin_delete_user(&self, token: &str, user_id: &UserId) -> Result<Ack, ApiError>;

    /// `GET /admin/bookings`
    async fn admin_list_bookings(
        &self,
        token: &str,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, ApiError>;
}

/// Error body returned by the API on not-OK responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`SpacerApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSpacerApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpacerApi {
    /// Create a client for the API at `base_url` (e.g. `http://127.0.0.1:5000`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// API origin, also used to resolve image paths
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_response(status, &body);
            tracing::warn!(status = status.as_u16(), error = %error, "API call rejected");
            Err(error)
        }
    }
}

fn error_from_response(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        _ => ApiError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

fn file_part(upload: Upload) -> Result<Part, ApiError> {
    Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)
        .map_err(|e| ApiError::RequestFailed(format!("invalid upload content type: {e}")))
}

#[async_trait]
impl SpacerApi for HttpSpacerApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.execute(self.client.post(self.url("/auth/login")).json(request))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Created<UserId>, ApiError> {
        self.execute(self.client.post(self.url("/auth/register")).json(request))
            .await
    }

    async fn list_spaces(&self, query: &SpaceQuery) -> Result<SpacePage, ApiError> {
        self.execute(self.client.get(self.url("/spaces")).query(query))
            .await
    }

    async fn get_space(&self, space_id: &SpaceId) -> Result<SpaceDetail, ApiError> {
        self.execute(self.client.get(self.url(&format!("/spaces/{space_id}"))))
            .await
    }

    async fn create_space(
        &self,
        token: &str,
        space: NewSpace,
    ) -> Result<Created<SpaceId>, ApiError> {
        let mut form = Form::new()
            .text("name", space.name)
            .text("description", space.description)
            .text("location", space.location)
            .text("type", String::from(space.space_type))
            .text("hourly_rate", space.hourly_rate.to_string())
            .text("day_rate", space.day_rate.to_string())
            .text("capacity", space.capacity.to_string());
        for image in space.images {
            form = form.part("image", file_part(image)?);
        }

        self.execute(
            self.client
                .post(self.url("/spaces"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }

    async fn create_booking(
        &self,
        token: &str,
        booking: &NewBooking,
    ) -> Result<CreatedBooking, ApiError> {
        self.execute(
            self.client
                .post(self.url("/bookings"))
                .bearer_auth(token)
                .json(booking),
        )
        .await
    }

    async fn verify_booking(
        &self,
        token: &str,
        booking_id: &BookingId,
        reference: &str,
    ) -> Result<VerifiedBooking, ApiError> {
        let body = VerifyBooking {
            reference: reference.to_string(),
        };
        self.execute(
            self.client
                .post(self.url(&format!("/bookings/{booking_id}/verify")))
                .bearer_auth(token)
                .json(&body),
        )
        .await
    }

    async fn my_bookings(
        &self,
        token: &str,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, ApiError> {
        let list: BookingList = self
            .execute(
                self.client
                    .get(self.url("/bookings/my-bookings"))
                    .bearer_auth(token)
                    .query(filter),
            )
            .await?;
        Ok(list.bookings)
    }

    async fn get_profile(&self, token: &str) -> Result<Profile, ApiError> {
        self.execute(self.client.get(self.url("/profile")).bearer_auth(token))
            .await
    }

    async fn update_profile(&self, token: &str, update: ProfileUpdate) -> Result<Ack, ApiError> {
        let mut form = Form::new()
            .text("username", update.username)
            .text("email", update.email);
        if let Some(picture) = update.picture {
            form = form.part("profile_picture", file_part(picture)?);
        }

        self.execute(
            self.client
                .put(self.url("/profile"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await
    }

    async fn submit_review(
        &self,
        token: &str,
        space_id: &SpaceId,
        review: &NewReview,
    ) -> Result<Created<String>, ApiError> {
        self.execute(
            self.client
                .post(self.url(&format!("/spaces/{space_id}/reviews")))
                .bearer_auth(token)
                .json(review),
        )
        .await
    }

    async fn roles(&self) -> Result<Vec<Role>, ApiError> {
        self.execute(self.client.get(self.url("/roles"))).await
    }

    async fn admin_list_spaces(&self, token: &str) -> Result<Vec<AdminSpace>, ApiError> {
        let list: AdminSpaceList = self
            .execute(self.client.get(self.url("/admin/spaces")).bearer_auth(token))
            .await?;
        Ok(list.spaces)
    }

    async fn admin_create_space(
        &self,
        token: &str,
        space: &AdminSpaceInput,
    ) -> Result<Created<SpaceId>, ApiError> {
        self.execute(
            self.client
                .post(self.url("/admin/spaces"))
                .bearer_auth(token)
                .json(space),
        )
        .await
    }

    async fn admin_update_space(
        &self,
        token: &str,
        space_id: &SpaceId,
        space: &AdminSpaceInput,
    ) -> Result<Ack, ApiError> {
        self.execute(
            self.client
                .put(self.url(&format!("/admin/spaces/{space_id}")))
                .bearer_auth(token)
                .json(space),
        )
        .await
    }

    async fn admin_delete_space(&self, token: &str, space_id: &SpaceId) -> Result<Ack, ApiError> {
        self.execute(
            self.client
                .delete(self.url(&format!("/admin/spaces/{space_id}")))
                .bearer_auth(token),
        )
        .await
    }

    async fn admin_list_users(&self, token: &str) -> Result<Vec<AdminUser>, ApiError> {
        let list: AdminUserList = self
            .execute(self.client.get(self.url("/admin/users")).bearer_auth(token))
            .await?;
        Ok(list.users)
    }

    async fn admin_create_user(
        &self,
        token: &str,
        user: &AdminUserInput,
    ) -> Result<Created<UserId>, ApiError> {
        self.execute(
            self.client
                .post(self.url("/admin/users"))
                .bearer_auth(token)
                .json(user),
        )
        .await
    }

    async fn admin_update_user(
        &self,
        token: &str,
        user_id: &UserId,
        user: &AdminUserInput,
    ) -> Result<Ack, ApiError> {
        self.execute(
            self.client
                .put(self.url(&format!("/admin/users/{user_id}")))
                .bearer_auth(token)
                .json(user),
        )
        .await
    }

    async fn admin_delete_user(&self, token: &str, user_id: &UserId) -> Result<Ack, ApiError> {
        self.execute(
            self.client
                .delete(self.url(&format!("/admin/users/{user_id}")))
                .bearer_auth(token),
        )
        .await
    }

    async fn admin_list_bookings(
        &self,
        token: &str,
        filter: &BookingFilter,
    ) -> Result<Vec<Booking>, ApiError> {
        let list: BookingList = self
            .execute(
                self.client
                    .get(self.url("/admin/bookings"))
                    .bearer_auth(token)
                    .query(filter),
            )
            .await?;
        Ok(list.bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_prefers_message_then_error_field() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message": "Space is not available"}"#,
        );
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 400,
                message: "Space is not available".to_string()
            }
        );

        let err = error_from_response(StatusCode::FORBIDDEN, r#"{"error": "nope"}"#);
        assert_eq!(err, ApiError::Forbidden("nope".to_string()));
    }

    #[test]
    fn test_error_falls_back_to_status_text() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, "<html>oops</html>");
        assert_eq!(err, ApiError::Unauthorized("Unauthorized".to_string()));
    }

    #[test]
    fn test_base_url_is_normalised() {
        let api = HttpSpacerApi::new("http://127.0.0.1:5000/");
        assert_eq!(api.base_url(), "http://127.0.0.1:5000");
        assert_eq!(api.url("/spaces"), "http://127.0.0.1:5000/spaces");
    }
}
