//! # Spacer Runtime
//!
//! Runtime implementation for Spacer page flows.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Spawns effect futures and feeds their actions back
//! - **`EffectHandle`**: Lets an HTTP handler wait until a flow has settled
//!
//! ## Example
//!
//! ```ignore
//! use spacer_runtime::Store;
//!
//! let store = Store::new(CatalogState::new(query), CatalogReducer, env);
//! store.send_and_wait(CatalogAction::Load, timeout).await?;
//! let page = store.state(|s| s.page.clone()).await;
//! ```

use spacer_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while waiting on a Store
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects did not settle before the deadline
        #[error("Effects did not complete within {0:?}")]
        Timeout(std::time::Duration),
    }
}

pub use error::StoreError;

/// Handle for waiting on the effects started by one `send`
///
/// Tracking cascades: when an effect feeds an action back into the store,
/// the effects produced by that action are counted against the same handle.
/// The handle completes once the whole chain has settled.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(CheckoutAction::Submit { .. }).await;
/// handle.wait_with_timeout(Duration::from_secs(10)).await?;
/// ```
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle
    ///
    /// Returns the handle for the caller and the tracking context that
    /// travels with effect execution.
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _tracking) = Self::new();
        handle
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout(timeout))
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Runs even if the effect future panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, DecrementGuard, Duration, Effect, EffectHandle, EffectTracking, Reducer, RwLock,
        StoreError,
    };
    use std::marker::PhantomData;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (page logic)
    /// 3. Environment (API clients, clock)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Cloning a Store is cheap and every clone shares the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        _action: PhantomData<fn(A)>,
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                _action: PhantomData,
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                _action: PhantomData,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the write lock, then starts the returned
        /// effects. The returned handle completes when those effects, and
        /// any effects produced by actions they feed back, have finished.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> EffectHandle {
            let (handle, tracking) = EffectHandle::new();
            self.dispatch(action, &tracking).await;
            handle
        }

        /// Send an action and wait until the flow it starts has settled
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Timeout`] if effects are still running when
        /// `timeout` elapses.
        pub async fn send_and_wait(&self, action: A, timeout: Duration) -> Result<(), StoreError> {
            let mut handle = self.send(action).await;
            handle.wait_with_timeout(timeout).await
        }

        /// Read current state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        async fn dispatch(&self, action: A, tracking: &EffectTracking) {
            tracing::debug!(?action, "Reducing action");
            metrics::counter!("spacer.store.actions").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };

            for effect in effects {
                self.execute_effect(effect, tracking);
            }
        }

        /// Execute an effect
        ///
        /// - `None`: No-op
        /// - `Parallel`: Executes each effect with the same tracking
        /// - `Future`: Spawns the computation, sends the resulting action if `Some`
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {},
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
                Effect::Future(fut) => {
                    metrics::counter!("spacer.store.effects").increment(1);
                    tracking.increment();

                    let tracking = tracking.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking.clone());

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            store.dispatch(action, &tracking).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use spacer_core::{SmallVec, smallvec};

    #[derive(Debug, Default)]
    struct FlowState {
        steps: Vec<&'static str>,
    }

    #[derive(Debug)]
    enum FlowAction {
        Start,
        Fetched,
        Finished,
        Hang,
    }

    #[derive(Clone)]
    struct FlowReducer;

    impl Reducer for FlowReducer {
        type State = FlowState;
        type Action = FlowAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut FlowState,
            action: FlowAction,
            _env: &(),
        ) -> SmallVec<[Effect<FlowAction>; 4]> {
            match action {
                FlowAction::Start => {
                    state.steps.push("start");
                    smallvec![Effect::future(async {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some(FlowAction::Fetched)
                    })]
                },
                FlowAction::Fetched => {
                    state.steps.push("fetched");
                    smallvec![Effect::merge(vec![
                        Effect::None,
                        Effect::future(async { Some(FlowAction::Finished) }),
                    ])]
                },
                FlowAction::Finished => {
                    state.steps.push("finished");
                    smallvec![]
                },
                FlowAction::Hang => smallvec![Effect::future(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    None
                })],
            }
        }
    }

    #[tokio::test]
    async fn test_send_waits_for_cascading_effects() {
        let store = Store::new(FlowState::default(), FlowReducer, ());

        store
            .send_and_wait(FlowAction::Start, Duration::from_secs(1))
            .await
            .unwrap();

        let steps = store.state(|s| s.steps.clone()).await;
        assert_eq!(steps, vec!["start", "fetched", "finished"]);
    }

    #[tokio::test]
    async fn test_action_without_effects_completes_immediately() {
        let store = Store::new(FlowState::default(), FlowReducer, ());

        let handle = store.send(FlowAction::Finished).await;
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let store = Store::new(FlowState::default(), FlowReducer, ());

        let result = store
            .send_and_wait(FlowAction::Hang, Duration::from_millis(20))
            .await;

        assert_eq!(result, Err(StoreError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_completed_handle_does_not_block() {
        let mut handle = EffectHandle::completed();
        handle
            .wait_with_timeout(Duration::from_millis(10))
            .await
            .unwrap();
    }
}
