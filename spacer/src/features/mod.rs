//! Page flows.
//!
//! Each module holds one flow's state, actions and reducer. Handlers build
//! a short-lived `Store` per request, send the page action, wait for the
//! cascade to settle and render the resulting state.

pub mod admin;
pub mod auth;
pub mod booking;
pub mod catalog;
pub mod checkout;
pub mod listing;
pub mod profile;
pub mod review;

/// Whether a text input was left empty.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Minimal email shape check; the API does the real validation.
pub(crate) fn looks_like_email(value: &str) -> bool {
    value
        .trim()
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty())
}

/// Parse a non-negative amount typed into a form.
pub(crate) fn parse_amount(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

/// Parse a positive count typed into a form.
pub(crate) fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|count| *count > 0)
}

/// Image formats the API accepts for uploads.
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Shown when an upload is not an accepted image format.
pub const IMAGE_FORMAT_ERROR: &str = "Images must be PNG, JPG or GIF files";

/// Whether a file name carries an accepted image extension.
pub(crate) fn is_image_file(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Non-blank trimmed text, `None` otherwise.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{
        admin::AdminState, auth::AuthState, catalog::CatalogState, checkout::CheckoutState,
        listing::ListingState, profile::ProfileState, review::ReviewState,
    };
    use crate::environment::{Settings, SpacerEnvironment};
    use spacer_testing::{FlowFeedback, MockPaymentGateway, MockSpacerApi, test_clock};
    use std::sync::Arc;
    use std::time::Duration;

    macro_rules! alert_only {
        ($($state:ty),*) => {$(
            impl FlowFeedback for $state {
                fn alert(&self) -> Option<&str> {
                    self.alert.as_deref()
                }
            }
        )*};
    }

    macro_rules! alert_and_errors {
        ($($state:ty),*) => {$(
            impl FlowFeedback for $state {
                fn alert(&self) -> Option<&str> {
                    self.alert.as_deref()
                }

                fn errors(&self) -> Vec<String> {
                    self.errors.clone()
                }
            }
        )*};
    }

    alert_only!(AdminState, CatalogState, ListingState, ProfileState);
    alert_and_errors!(AuthState, CheckoutState, ReviewState);

    /// How long store tests wait for a flow
    pub(crate) const WAIT: Duration = Duration::from_secs(2);

    /// Environment over the given mocks and the fixed test clock
    pub(crate) fn env(api: &MockSpacerApi, gateway: &MockPaymentGateway) -> SpacerEnvironment {
        SpacerEnvironment::new(
            Arc::new(api.clone()),
            Arc::new(gateway.clone()),
            Arc::new(test_clock()),
            Settings::default(),
        )
    }

    /// Environment with an empty gateway
    pub(crate) fn api_env(api: &MockSpacerApi) -> SpacerEnvironment {
        env(api, &MockPaymentGateway::new())
    }
}
