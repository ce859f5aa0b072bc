//! # Spacer Testing
//!
//! Testing utilities and helpers for Spacer page flows.
//!
//! This crate provides:
//! - `ReducerTest`, a Given-When-Then harness for reducers
//! - `FixedClock` for deterministic "now"
//! - In-memory `SpacerApi` and `PaymentGateway` mocks that record calls
//! - Fixtures for the API's wire types
//!
//! ## Example
//!
//! ```ignore
//! use spacer_testing::{MockSpacerApi, fixtures, test_clock};
//!
//! #[tokio::test]
//! async fn test_catalog_loads() {
//!     let api = MockSpacerApi::new().with_spaces(vec![fixtures::space("s-1", "Loft")]);
//!     let store = Store::new(CatalogState::default(), CatalogReducer, env_with(api));
//!     store.send_and_wait(CatalogAction::Load, Duration::from_secs(1)).await?;
//! }
//! ```

use chrono::{DateTime, Utc};
use spacer_core::environment::Clock;

pub mod fixtures;
pub mod reducer_test;
pub mod api_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use spacer_testing::mocks::FixedClock;
    /// use spacer_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{FlowFeedback, ReducerTest, assertions};
pub use api_mocks::{MockPaymentGateway, MockSpacerApi};
