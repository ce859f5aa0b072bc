//! Payment provider hand-off.
//!
//! The front-end only initializes a hosted checkout and redirects the
//! browser to it. Verification goes through the Spacer API, not the
//! provider.

use crate::error::ApiError;
use crate::models::BookingId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the provider needs to open a hosted checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInit {
    /// Payer email
    pub email: String,
    /// Amount in major units (as computed by the API)
    pub amount: f64,
    /// ISO currency code
    pub currency: String,
    /// Our reference, echoed back on the callback
    pub reference: String,
    /// Where the provider sends the browser afterwards
    pub callback_url: String,
    /// Booking being paid for
    pub booking_id: BookingId,
}

impl PaymentInit {
    /// Amount in minor units (cents), as providers expect
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn minor_units(&self) -> u64 {
        (self.amount.max(0.0) * 100.0).round() as u64
    }
}

/// A checkout the browser can be redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Hosted checkout page
    pub checkout_url: String,
    /// Reference the provider registered
    pub reference: String,
}

/// Initializes hosted checkouts.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout for the given payment
    async fn initialize(&self, payment: &PaymentInit) -> Result<Checkout, ApiError>;
}

#[derive(Debug, Serialize)]
struct InitializeRequest<'a> {
    email: &'a str,
    amount: u64,
    reference: &'a str,
    currency: &'a str,
    callback_url: &'a str,
    metadata: InitializeMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct InitializeMetadata<'a> {
    booking_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<InitializeData>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    reference: String,
}

/// [`PaymentGateway`] backed by Paystack's transaction API.
#[derive(Clone)]
pub struct PaystackGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PaystackGateway {
    /// Create a gateway for `base_url` (normally `https://api.paystack.co`)
    #[must_use]
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, secret_key)
    }

    /// Create a gateway sharing a preconfigured client (timeouts, proxies)
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for PaystackGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize(&self, payment: &PaymentInit) -> Result<Checkout, ApiError> {
        let request = InitializeRequest {
            email: &payment.email,
            amount: payment.minor_units(),
            reference: &payment.reference,
            currency: &payment.currency,
            callback_url: &payment.callback_url,
            metadata: InitializeMetadata {
                booking_id: payment.booking_id.as_str(),
            },
        };

        tracing::info!(
            booking_id = %payment.booking_id,
            reference = %payment.reference,
            amount = request.amount,
            "Initializing payment"
        );

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body: InitializeResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))?;

        match body.data {
            Some(data) if body.status && status.is_success() => Ok(Checkout {
                checkout_url: data.authorization_url,
                reference: data.reference,
            }),
            _ => Err(ApiError::Gateway(if body.message.is_empty() {
                format!("payment provider returned {status}")
            } else {
                body.message
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: f64) -> PaymentInit {
        PaymentInit {
            email: "amina@example.com".to_string(),
            amount,
            currency: "KES".to_string(),
            reference: "spacer-b-1-1".to_string(),
            callback_url: "http://localhost:3000/checkout/return".to_string(),
            booking_id: BookingId::new("b-1"),
        }
    }

    #[test]
    fn test_minor_units_rounds_to_cents() {
        assert_eq!(payment(150.0).minor_units(), 15_000);
        assert_eq!(payment(19.999).minor_units(), 2_000);
        assert_eq!(payment(-3.0).minor_units(), 0);
    }

    #[test]
    fn test_debug_hides_secret() {
        let gateway = PaystackGateway::new("https://api.paystack.co/", "sk_test_secret");
        let rendered = format!("{gateway:?}");
        assert!(rendered.contains("https://api.paystack.co"));
        assert!(!rendered.contains("sk_test_secret"));
    }
}
