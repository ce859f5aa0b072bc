//! Dependencies injected into every page reducer.

use crate::config::SpacerConfig;
use spacer_api::{PaymentGateway, SpacerApi};
use spacer_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Settings the page flows read but never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Origin of the Spacer API, used to resolve image paths
    pub asset_base: String,
    /// Public origin of this front-end
    pub public_url: String,
    /// ISO currency code for payments
    pub currency: String,
    /// Catalog page size
    pub page_size: u32,
    /// Upper bound on how long a request waits for its flow
    pub flow_timeout: Duration,
}

impl Settings {
    /// Settings derived from the process configuration
    #[must_use]
    pub fn from_config(config: &SpacerConfig) -> Self {
        Self {
            asset_base: config.api_url.clone(),
            public_url: config.public_url.clone(),
            currency: config.currency.clone(),
            page_size: config.page_size,
            flow_timeout: config.flow_timeout,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset_base: "http://127.0.0.1:5000".to_string(),
            public_url: "http://localhost:3000".to_string(),
            currency: "KES".to_string(),
            page_size: 6,
            flow_timeout: Duration::from_secs(45),
        }
    }
}

/// Environment shared by all Spacer reducers.
///
/// Cloning is cheap; every field is reference counted. The same value is
/// the axum router state.
#[derive(Clone)]
pub struct SpacerEnvironment {
    /// Spacer REST API
    pub api: Arc<dyn SpacerApi>,
    /// Payment provider
    pub payments: Arc<dyn PaymentGateway>,
    /// Source of "now"
    pub clock: Arc<dyn Clock>,
    /// Static settings
    pub settings: Arc<Settings>,
}

impl SpacerEnvironment {
    /// Creates a new `SpacerEnvironment`
    #[must_use]
    pub fn new(
        api: Arc<dyn SpacerApi>,
        payments: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        settings: Settings,
    ) -> Self {
        Self {
            api,
            payments,
            clock,
            settings: Arc::new(settings),
        }
    }
}

impl std::fmt::Debug for SpacerEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpacerEnvironment")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
