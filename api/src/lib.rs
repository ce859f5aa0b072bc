//! # Spacer API
//!
//! Typed clients for the two external services the Spacer front-end talks
//! to: the Spacer REST API (auth, catalog, bookings, reviews, admin) and the
//! payment provider's transaction initialization endpoint.
//!
//! Both are exposed as object-safe traits so page reducers can hold them as
//! `Arc<dyn SpacerApi>` / `Arc<dyn PaymentGateway>` and tests can swap in
//! mocks.
//!
//! ## Example
//!
//! ```no_run
//! use spacer_api::{HttpSpacerApi, SpacerApi, models::SpaceQuery};
//!
//! # async fn example() -> Result<(), spacer_api::ApiError> {
//! let api = HttpSpacerApi::new("http://127.0.0.1:5000");
//! let page = api.list_spaces(&SpaceQuery::default()).await?;
//! println!("{} spaces", page.total);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod payment;

pub use client::{HttpSpacerApi, SpacerApi};
pub use error::ApiError;
pub use payment::{Checkout, PaymentGateway, PaymentInit, PaystackGateway};
