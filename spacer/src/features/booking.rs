//! Booking dialog: date range entry and validation.
//!
//! Dates arrive as `datetime-local` strings and are read as UTC. The
//! dialog is re-rendered by the server, so "Check dates" is an action of
//! its own; submission itself belongs to [`checkout`](super::checkout).

use crate::environment::SpacerEnvironment;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use spacer_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Accepted `datetime-local` layouts (minutes, optionally seconds).
const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Layout used to echo a date back into the input.
pub const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Raw dialog fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BookingForm {
    /// Start, `YYYY-MM-DDTHH:MM`
    #[serde(default)]
    pub start: String,
    /// End, `YYYY-MM-DDTHH:MM`
    #[serde(default)]
    pub end: String,
    /// Optional agreement terms
    #[serde(default)]
    pub terms: String,
}

/// A validated date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookingDates {
    /// Start of the reservation (UTC)
    pub start: NaiveDateTime,
    /// End of the reservation (UTC)
    pub end: NaiveDateTime,
}

/// Parse a `datetime-local` value.
#[must_use]
pub fn parse_input(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

impl BookingForm {
    /// Validate the range against `now`.
    ///
    /// # Errors
    ///
    /// Returns every message that applies, in display order.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<BookingDates, Vec<String>> {
        let mut errors = Vec::new();
        let now = now.naive_utc();

        let start = if self.start.trim().is_empty() {
            errors.push("Start date is required".to_string());
            None
        } else {
            let parsed = parse_input(&self.start);
            match parsed {
                None => errors.push("Start date is invalid".to_string()),
                Some(start) if start < now => {
                    errors.push("Start date cannot be in the past".to_string());
                },
                Some(_) => {},
            }
            parsed
        };

        let end = if self.end.trim().is_empty() {
            errors.push("End date is required".to_string());
            None
        } else {
            let parsed = parse_input(&self.end);
            if parsed.is_none() {
                errors.push("End date is invalid".to_string());
            }
            parsed
        };

        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.push("End date must be after start date".to_string());
            }
        }

        match (start, end) {
            (Some(start), Some(end)) if errors.is_empty() => Ok(BookingDates { start, end }),
            _ => Err(errors),
        }
    }

    /// Whether the dialog may be submitted at `now`
    #[must_use]
    pub fn can_submit(&self, now: DateTime<Utc>) -> bool {
        self.validate(now).is_ok()
    }

    /// Terms, if the user typed any
    #[must_use]
    pub fn terms(&self) -> Option<String> {
        super::non_blank(&self.terms)
    }
}

/// State of the booking dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingDialogState {
    /// Values echoed back into the inputs
    pub form: BookingForm,
    /// Validation messages from the last check
    pub errors: Vec<String>,
    /// Whether the submit button is enabled
    pub can_submit: bool,
}

/// Booking dialog actions.
#[derive(Clone, Debug)]
pub enum BookingDialogAction {
    /// User pressed "Check dates"
    Check(BookingForm),
}

/// Reducer for the booking dialog
#[derive(Clone, Debug, Default)]
pub struct BookingDialogReducer;

impl Reducer for BookingDialogReducer {
    type State = BookingDialogState;
    type Action = BookingDialogAction;
    type Environment = SpacerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingDialogAction::Check(form) => {
                let result = form.validate(env.clock.now());
                state.can_submit = result.is_ok();
                state.errors = result.err().unwrap_or_default();
                state.form = form;
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::test_support::api_env;
    use proptest::prelude::*;
    use spacer_core::environment::Clock;
    use spacer_testing::{MockSpacerApi, ReducerTest, assertions, test_clock};

    fn form(start: &str, end: &str) -> BookingForm {
        BookingForm {
            start: start.to_string(),
            end: end.to_string(),
            terms: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        test_clock().now()
    }

    #[test]
    fn test_valid_range() {
        let dates = form("2025-01-02T10:00", "2025-01-02T12:00").validate(now()).unwrap();
        assert_eq!(dates.start.format(INPUT_FORMAT).to_string(), "2025-01-02T10:00");
        assert_eq!(dates.end.format(INPUT_FORMAT).to_string(), "2025-01-02T12:00");
    }

    #[test]
    fn test_seconds_are_accepted() {
        assert!(form("2025-01-02T10:00:30", "2025-01-02T12:00:00").can_submit(now()));
    }

    #[test]
    fn test_required_dates() {
        let errors = form("", " ").validate(now()).unwrap_err();
        assert_eq!(errors, vec!["Start date is required", "End date is required"]);
    }

    #[test]
    fn test_end_at_start_is_rejected() {
        let errors = form("2025-01-02T10:00", "2025-01-02T10:00").validate(now()).unwrap_err();
        assert_eq!(errors, vec!["End date must be after start date"]);
    }

    #[test]
    fn test_start_in_past_is_rejected() {
        let errors = form("2024-12-31T23:59", "2025-01-02T10:00").validate(now()).unwrap_err();
        assert_eq!(errors, vec!["Start date cannot be in the past"]);
    }

    #[test]
    fn test_start_exactly_now_is_allowed() {
        assert!(form("2025-01-01T00:00", "2025-01-01T01:00").can_submit(now()));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let errors = form("tomorrow", "2025-01-02T10:00").validate(now()).unwrap_err();
        assert_eq!(errors, vec!["Start date is invalid"]);
    }

    #[test]
    fn test_check_disables_submit_until_valid() {
        ReducerTest::new(BookingDialogReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(BookingDialogState::default())
            .when_action(BookingDialogAction::Check(form("2025-01-02T10:00", "")))
            .then_state(|state| {
                assert!(!state.can_submit);
                assert_eq!(state.errors, vec!["End date is required"]);
                assert_eq!(state.form.start, "2025-01-02T10:00");
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        ReducerTest::new(BookingDialogReducer)
            .with_env(api_env(&MockSpacerApi::new()))
            .given_state(BookingDialogState::default())
            .when_action(BookingDialogAction::Check(form(
                "2025-01-02T10:00",
                "2025-01-02T11:00",
            )))
            .then_state(|state| {
                assert!(state.can_submit);
                assert!(state.errors.is_empty());
            })
            .run();
    }

    fn input(minutes: i64) -> String {
        (now().naive_utc() + chrono::Duration::minutes(minutes))
            .format(INPUT_FORMAT)
            .to_string()
    }

    proptest! {
        #[test]
        fn prop_end_at_or_before_start_is_rejected(start in 0i64..100_000, back in 0i64..10_000) {
            let result = form(&input(start), &input(start - back)).validate(now());
            let errors = result.unwrap_err();
            prop_assert!(errors.contains(&"End date must be after start date".to_string()));
        }

        #[test]
        fn prop_start_before_now_is_rejected(ago in 1i64..100_000, length in 1i64..10_000) {
            let result = form(&input(-ago), &input(-ago + length)).validate(now());
            let errors = result.unwrap_err();
            prop_assert!(errors.contains(&"Start date cannot be in the past".to_string()));
        }

        #[test]
        fn prop_future_ranges_are_accepted(start in 0i64..100_000, length in 1i64..10_000) {
            let dates = form(&input(start), &input(start + length)).validate(now());
            prop_assert!(dates.is_ok());
        }
    }
}
