//! Process configuration.
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file by `main`). Only the payment provider's secret key is
//! mandatory; every other setting has a development default.
//!
//! # Example
//!
//! ```no_run
//! use spacer::config::SpacerConfig;
//!
//! # fn main() -> Result<(), spacer::config::ConfigError> {
//! let config = SpacerConfig::from_env()?;
//! println!("Serving on {}", config.bind_addr);
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// A variable is set but cannot be parsed
    #[error("Failed to parse {var}: {message}")]
    ParseError {
        /// Variable name
        var: String,
        /// Parser message
        message: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Front-end configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpacerConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// Base URL of the Spacer REST API (also serves space images)
    pub api_url: String,
    /// Public origin of this front-end, used for payment callbacks
    pub public_url: String,
    /// Base URL of the payment provider
    pub paystack_base_url: String,
    /// Payment provider secret key
    pub paystack_secret_key: String,
    /// ISO currency code sent with payments
    pub currency: String,
    /// Catalog page size
    pub page_size: u32,
    /// Upper bound on a single API or payment provider call
    pub request_timeout: Duration,
    /// Upper bound on how long a page waits for its whole flow
    pub flow_timeout: Duration,
}

impl SpacerConfig {
    /// Variable holding the bind address
    pub const BIND_ADDR: &'static str = "SPACER_BIND_ADDR";
    /// Variable holding the API base URL
    pub const API_URL: &'static str = "SPACER_API_URL";
    /// Variable holding the public origin
    pub const PUBLIC_URL: &'static str = "SPACER_PUBLIC_URL";
    /// Variable holding the payment provider base URL
    pub const PAYSTACK_BASE_URL: &'static str = "PAYSTACK_BASE_URL";
    /// Variable holding the payment provider secret key
    pub const PAYSTACK_SECRET_KEY: &'static str = "PAYSTACK_SECRET_KEY";
    /// Variable holding the currency code
    pub const CURRENCY: &'static str = "SPACER_CURRENCY";
    /// Variable holding the catalog page size
    pub const PAGE_SIZE: &'static str = "SPACER_PAGE_SIZE";
    /// Variable holding the per-call timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: &'static str = "SPACER_REQUEST_TIMEOUT_SECS";
    /// Variable holding the page flow timeout in seconds
    pub const FLOW_TIMEOUT_SECS: &'static str = "SPACER_FLOW_TIMEOUT_SECS";

    /// Most calls any page flow chains one after another
    /// (checkout: create booking, profile lookup, payment initialization).
    pub const LONGEST_CALL_CHAIN: u32 = 3;

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = parse_or(&get, Self::BIND_ADDR, "0.0.0.0:3000".parse::<SocketAddr>())?;
        let page_size = parse_or(&get, Self::PAGE_SIZE, Ok::<u32, std::num::ParseIntError>(6))?;
        let timeout_secs = parse_or(
            &get,
            Self::REQUEST_TIMEOUT_SECS,
            Ok::<u64, std::num::ParseIntError>(15),
        )?;
        let flow_secs = parse_or(
            &get,
            Self::FLOW_TIMEOUT_SECS,
            Ok::<u64, std::num::ParseIntError>(
                timeout_secs.saturating_mul(u64::from(Self::LONGEST_CALL_CHAIN)),
            ),
        )?;

        let config = Self {
            bind_addr,
            api_url: trim_url(get(Self::API_URL), "http://127.0.0.1:5000"),
            public_url: trim_url(get(Self::PUBLIC_URL), "http://localhost:3000"),
            paystack_base_url: trim_url(get(Self::PAYSTACK_BASE_URL), "https://api.paystack.co"),
            paystack_secret_key: get(Self::PAYSTACK_SECRET_KEY)
                .ok_or_else(|| ConfigError::EnvVarNotSet(Self::PAYSTACK_SECRET_KEY.to_string()))?,
            currency: get(Self::CURRENCY)
                .map_or_else(|| "KES".to_string(), |c| c.trim().to_uppercase()),
            page_size,
            request_timeout: Duration::from_secs(timeout_secs),
            flow_timeout: Duration::from_secs(flow_secs),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            (Self::API_URL, &self.api_url),
            (Self::PUBLIC_URL, &self.public_url),
            (Self::PAYSTACK_BASE_URL, &self.paystack_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be an http(s) URL, got {url}"
                )));
            }
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a three letter code, got {}",
                Self::CURRENCY,
                self.currency
            )));
        }

        if self.page_size == 0 || self.page_size > 100 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between 1 and 100",
                Self::PAGE_SIZE
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "{} must be positive",
                Self::REQUEST_TIMEOUT_SECS
            )));
        }

        let chain = self.request_timeout.checked_mul(Self::LONGEST_CALL_CHAIN);
        if chain.is_none_or(|chain| self.flow_timeout < chain) {
            return Err(ConfigError::ValidationError(format!(
                "{} must cover {} chained calls of {}",
                Self::FLOW_TIMEOUT_SECS,
                Self::LONGEST_CALL_CHAIN,
                Self::REQUEST_TIMEOUT_SECS
            )));
        }

        Ok(())
    }
}

fn parse_or<T, E, G>(get: &G, key: &str, default: Result<T, E>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    E: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            var: key.to_string(),
            message: e.to_string(),
        }),
        None => default.map_err(|e| ConfigError::ParseError {
            var: key.to_string(),
            message: e.to_string(),
        }),
    }
}

fn trim_url(value: Option<String>, default: &str) -> String {
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .trim_end_matches('/')
        .to_string()
}
