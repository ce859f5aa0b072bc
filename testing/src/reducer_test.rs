//! Given-When-Then harness for page reducers.
//!
//! A page reducer is tested in isolation: seed a state, apply one action
//! (or a short sequence), then check what the page would show and which
//! effects the store would be asked to run. Nothing is spawned; futures in
//! the returned effects are inspected, never awaited.

#![allow(clippy::module_name_repetitions)]

use spacer_core::{effect::Effect, reducer::Reducer};

/// What every page flow surfaces to the user besides its own data.
///
/// Implemented by page states so tests can check the alert banner and the
/// inline validation list without knowing each state's field names.
pub trait FlowFeedback {
    /// Blocking alert, if any
    fn alert(&self) -> Option<&str>;

    /// Inline validation messages
    fn errors(&self) -> Vec<String> {
        Vec::new()
    }
}

enum Check<S, A> {
    State(Box<dyn FnOnce(&S)>),
    Effects(Box<dyn FnOnce(&[Effect<A>])>),
}

/// Fluent reducer test.
///
/// # Example
///
/// ```ignore
/// use spacer_testing::{ReducerTest, assertions};
///
/// ReducerTest::new(CheckoutReducer)
///     .with_env(env(&api, &gateway))
///     .given_state(CheckoutState::for_session("token"))
///     .when_action(CheckoutAction::TimedOut)
///     .then_alert(BOOKING_PENDING)
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    environment: Option<R::Environment>,
    state: Option<R::State>,
    actions: Vec<R::Action>,
    checks: Vec<Check<R::State, R::Action>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
{
    /// Start a test for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            state: None,
            actions: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Environment handed to the reducer
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Starting state
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Action under test
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Several actions in order; effects are checked for the last one only
    #[must_use]
    pub fn when_actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = R::Action>,
    {
        self.actions.extend(actions);
        self
    }

    /// Check the resulting state
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.checks.push(Check::State(Box::new(check)));
        self
    }

    /// Check the effects returned by the last action
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<R::Action>]) + 'static,
    {
        self.checks.push(Check::Effects(Box::new(check)));
        self
    }

    /// Apply the actions and run every check in the order it was added
    ///
    /// # Panics
    ///
    /// Panics if the state, environment or action is missing, or if a
    /// check fails.
    #[allow(clippy::panic)]
    pub fn run(self) {
        let reducer_name = std::any::type_name::<R>();
        let Some(mut state) = self.state else {
            panic!("{reducer_name}: call given_state() before run()");
        };
        let Some(env) = self.environment else {
            panic!("{reducer_name}: call with_env() before run()");
        };
        if self.actions.is_empty() {
            panic!("{reducer_name}: call when_action() before run()");
        }

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for check in self.checks {
            match check {
                Check::State(check) => check(&state),
                Check::Effects(check) => check(&effects),
            }
        }
    }
}

impl<R> ReducerTest<R>
where
    R: Reducer,
    R::State: FlowFeedback,
{
    /// Expect the alert banner to read `expected`
    #[must_use]
    pub fn then_alert(self, expected: &'static str) -> Self {
        self.then_state(move |state| assertions::assert_alert(state, expected))
    }

    /// Expect neither an alert nor validation messages
    #[must_use]
    pub fn then_clean(self) -> Self {
        self.then_state(|state| {
            assert_eq!(state.alert(), None, "unexpected alert");
            assert!(state.errors().is_empty(), "unexpected errors: {:?}", state.errors());
        })
    }
}

/// Effect and feedback assertions.
pub mod assertions {
    use super::FlowFeedback;
    use spacer_core::effect::Effect;

    /// Nothing for the store to run
    ///
    /// # Panics
    ///
    /// Panics if any effect would do work.
    #[allow(clippy::panic)]
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected no work, reducer returned {effects:?}"
        );
    }

    /// Exactly `expected` effects
    ///
    /// # Panics
    ///
    /// Panics on a different count.
    #[allow(clippy::panic)]
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "wrong number of effects");
    }

    /// At least one API call (a `Future` effect), possibly inside a
    /// `Parallel` group
    ///
    /// # Panics
    ///
    /// Panics if no effect would call out.
    #[allow(clippy::panic)]
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        fn calls_out<A>(effect: &Effect<A>) -> bool {
            match effect {
                Effect::Future(_) => true,
                Effect::Parallel(group) => group.iter().any(calls_out),
                Effect::None => false,
            }
        }
        assert!(effects.iter().any(calls_out), "expected an API call, found none");
    }

    /// Alert banner reads `expected`
    ///
    /// # Panics
    ///
    /// Panics on a missing or different alert.
    #[allow(clippy::panic)]
    pub fn assert_alert<S: FlowFeedback>(state: &S, expected: &str) {
        assert_eq!(state.alert(), Some(expected), "wrong alert");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacer_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct HoldState {
        held: u32,
        alert: Option<String>,
    }

    impl FlowFeedback for HoldState {
        fn alert(&self) -> Option<&str> {
            self.alert.as_deref()
        }
    }

    #[derive(Clone, Debug)]
    enum HoldAction {
        Hold,
        Release,
        Confirm,
    }

    struct HoldReducer;

    impl Reducer for HoldReducer {
        type State = HoldState;
        type Action = HoldAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                HoldAction::Hold => {
                    state.held += 1;
                    smallvec![Effect::Parallel(vec![Effect::future(async {
                        Some(HoldAction::Confirm)
                    })])]
                },
                HoldAction::Release if state.held == 0 => {
                    state.alert = Some("Nothing to release".to_string());
                    SmallVec::new()
                },
                HoldAction::Release => {
                    state.held -= 1;
                    smallvec![Effect::None]
                },
                HoldAction::Confirm => SmallVec::new(),
            }
        }
    }

    #[test]
    fn test_effects_of_a_single_action() {
        ReducerTest::new(HoldReducer)
            .with_env(())
            .given_state(HoldState::default())
            .when_action(HoldAction::Hold)
            .then_state(|state| assert_eq!(state.held, 1))
            .then_effects(assertions::assert_has_future_effect)
            .then_clean()
            .run();
    }

    #[test]
    fn test_sequence_checks_the_last_effects() {
        ReducerTest::new(HoldReducer)
            .with_env(())
            .given_state(HoldState::default())
            .when_actions([HoldAction::Hold, HoldAction::Release])
            .then_state(|state| assert_eq!(state.held, 0))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_alert_check() {
        ReducerTest::new(HoldReducer)
            .with_env(())
            .given_state(HoldState::default())
            .when_action(HoldAction::Release)
            .then_alert("Nothing to release")
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    #[should_panic(expected = "call given_state()")]
    fn test_missing_state_is_reported() {
        ReducerTest::new(HoldReducer)
            .with_env(())
            .when_action(HoldAction::Hold)
            .run();
    }
}
