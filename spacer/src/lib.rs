//! # Spacer
//!
//! Server-rendered front-end for the Spacer marketplace: visitors browse
//! and book spaces, owners list them, admins run the back-office.
//!
//! The crate is thin glue over the Spacer REST API and the payment
//! provider:
//!
//! - [`features`]: one reducer per page flow (auth, catalog, booking
//!   dialog, checkout, listing, profile, review, admin)
//! - [`handlers`]: axum handlers that run a flow per request
//! - [`views`]: askama templates
//! - [`router`]: the route table
//! - [`config`] and [`environment`]: process settings and injected clients
//!
//! ## Running
//!
//! ```bash
//! PAYSTACK_SECRET_KEY=sk_test_xxx SPACER_API_URL=http://127.0.0.1:5000 cargo run --bin spacer
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod environment;
pub mod features;
pub mod handlers;
pub mod router;
pub mod views;

pub use config::{ConfigError, SpacerConfig};
pub use environment::{Settings, SpacerEnvironment};
pub use router::router;
