//! # Bookflow Runtime
//!
//! The [`Store`] runtime that drives a reducer: it serializes action
//! processing over the feature state, executes the effects the reducer
//! returns, and feeds effect-produced actions back into the reducer.
//!
//! A booking widget owns exactly one store for its flow. All mutations go
//! through [`Store::send`]; reads go through [`Store::state`]. Collaborator
//! round-trips (discount validation, checkout submission) run as spawned
//! effects whose completion actions are broadcast, so request/response
//! callers can [`Store::send_and_wait_for`] the matching outcome.
//!
//! ## Example
//!
//! ```ignore
//! use bookflow_runtime::Store;
//!
//! let store = Store::new(CartState::default(), CartReducer::new(), env);
//!
//! let handle = store.send(CartAction::RemoveLine { line_id }).await;
//! handle.wait().await; // all effects (and their feedback) finished
//!
//! let totals = store.state(|s| s.totals()).await;
//! ```

use bookflow_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, RwLock, broadcast};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Timeout waiting for a terminal action
        ///
        /// Returned by `send_and_wait_for` and `EffectHandle::wait_with_timeout`
        /// when the timeout expires first.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store was dropped while a waiter was still subscribed.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Tracks outstanding effect tasks spawned for one `send` call.
///
/// The counter covers the whole cascade: an effect that feeds an action back
/// into the reducer runs that action's follow-up effects before the counter
/// drops, so `wait()` returns only when the flow is quiescent.
#[derive(Clone)]
struct EffectTracking {
    pending: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl EffectTracking {
    fn new() -> Self {
        Self {
            pending: Arc::new(AtomicUsize::new(0)),
            notify: Arc::new(Notify::new()),
        }
    }

    fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}

/// RAII guard that decrements the effect counter on drop
///
/// Ensures the counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Handle returned by [`Store::send`] for awaiting effect completion
///
/// `send()` returns after *starting* effect execution. Tests and
/// request/response callers use the handle to wait for the effects (and any
/// actions they fed back) to finish.
pub struct EffectHandle {
    tracking: EffectTracking,
}

impl EffectHandle {
    /// Number of effect tasks still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tracking.pending.load(Ordering::SeqCst)
    }

    /// Wait until all effects spawned by the originating `send` finish
    pub async fn wait(&self) {
        loop {
            let notified = self.tracking.notify.notified();
            tokio::pin!(notified);
            // Register for the wakeup before re-checking the counter, so a
            // decrement between the check and the await cannot be missed.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Wait for effect completion with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the
    /// timeout elapses.
    pub async fn wait_with_timeout(&self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

/// The Store - runtime coordinator for a reducer
///
/// The store manages:
/// 1. State (behind an `RwLock`; reducer runs hold the write lock)
/// 2. The reducer (feature logic)
/// 3. The environment (injected collaborators)
/// 4. Effect execution with the action feedback loop
///
/// Concurrent `send()` calls serialize at the reducer, which is what gives
/// the cart its single-writer ownership model: there is no scenario in which
/// two mutations race.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: Arc<R>,
    environment: Arc<E>,
    /// Every action processed by the reducer (sent or fed back by an
    /// effect) is broadcast to observers. This is what makes
    /// request/response flows possible: apply a promo code, then wait for
    /// the accepted/rejected completion action.
    action_broadcast: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// Default action broadcast capacity is 16; use
    /// [`Store::with_broadcast_capacity`] if observers frequently lag.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
    }

    /// Create a new store with a custom action broadcast capacity
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: S,
        reducer: R,
        environment: E,
        capacity: usize,
    ) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity);

        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            action_broadcast,
        }
    }

    /// Send an action to the store
    ///
    /// 1. Acquires the write lock on state
    /// 2. Runs the reducer with (state, action, environment)
    /// 3. Broadcasts the action to observers
    /// 4. Spawns the returned effects; effect-produced actions re-enter here
    ///
    /// Returns an [`EffectHandle`] covering the full effect cascade.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> EffectHandle {
        let tracking = EffectTracking::new();
        self.dispatch(action, &tracking).await;
        EffectHandle { tracking }
    }

    /// Send an action and wait for a matching result action
    ///
    /// Designed for request/response flows: subscribe to the action
    /// broadcast *before* sending (so the completion can't be missed), send
    /// the action, then wait for the first broadcast action matching the
    /// predicate.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: no matching action before the timeout
    /// - [`StoreError::ChannelClosed`]: broadcast channel closed while waiting
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        mut predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: FnMut(&A) -> bool,
    {
        let mut receiver = self.action_broadcast.subscribe();
        let _handle = self.send(action).await;

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let received = tokio::time::timeout_at(deadline, receiver.recv())
                .await
                .map_err(|_| StoreError::Timeout)?;

            match received {
                Ok(action) if predicate(&action) => return Ok(action),
                Ok(_) => {},
                // Lagged observers skip missed actions and keep listening.
                Err(broadcast::error::RecvError::Lagged(_)) => {},
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(StoreError::ChannelClosed);
                },
            }
        }
    }

    /// Read a value out of the current state
    ///
    /// Takes a closure so callers extract what they need without cloning the
    /// whole state.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Subscribe to the action broadcast
    ///
    /// Observers see every action the reducer processes, in order (subject
    /// to broadcast capacity).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<A> {
        self.action_broadcast.subscribe()
    }

    /// Run the reducer for one action and spawn the resulting effects.
    async fn dispatch(&self, action: A, tracking: &EffectTracking) {
        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action.clone(), &self.environment)
        };
        metrics::counter!("store.actions.processed").increment(1);

        // Broadcast after the state transition so observers reading state
        // on receipt see the post-action world.
        let _ = self.action_broadcast.send(action);

        for effect in effects {
            self.spawn_effect(effect, tracking);
        }
    }

    /// Spawn one effect as a task tracked by the caller's handle.
    fn spawn_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
        tracking.increment();
        let guard_tracking = tracking.clone();
        let store = self.clone();
        let tracking = tracking.clone();
        tokio::spawn(async move {
            let _guard = DecrementGuard(guard_tracking);
            metrics::counter!("store.effects.started").increment(1);
            store.run_effect(effect, &tracking).await;
        });
    }

    /// Execute one effect, feeding produced actions back into the reducer.
    ///
    /// Feedback actions run their own follow-up effects inline within this
    /// task so the originating [`EffectHandle`] covers the whole cascade.
    fn run_effect<'a>(
        &'a self,
        effect: Effect<A>,
        tracking: &'a EffectTracking,
    ) -> futures::future::BoxFuture<'a, ()> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Parallel(effects) => {
                    futures::future::join_all(
                        effects.into_iter().map(|e| self.run_effect(e, tracking)),
                    )
                    .await;
                },
                Effect::Sequential(effects) => {
                    for e in effects {
                        self.run_effect(e, tracking).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    self.dispatch(*action, tracking).await;
                },
                Effect::Future(future) => {
                    if let Some(action) = future.await {
                        self.dispatch(action, tracking).await;
                    }
                },
            }
        })
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
            action_broadcast: self.action_broadcast.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookflow_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct CounterState {
        count: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CounterAction {
        Increment,
        IncrementLater,
        Incremented,
    }

    struct CounterReducer;
    struct NoEnv;

    impl Reducer for CounterReducer {
        type State = CounterState;
        type Action = CounterAction;
        type Environment = NoEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                CounterAction::Increment => {
                    state.count += 1;
                    SmallVec::new()
                },
                CounterAction::IncrementLater => {
                    smallvec![Effect::Future(Box::pin(async {
                        Some(CounterAction::Incremented)
                    }))]
                },
                CounterAction::Incremented => {
                    state.count += 1;
                    SmallVec::new()
                },
            }
        }
    }

    #[tokio::test]
    async fn send_runs_reducer_synchronously() {
        let store = Store::new(CounterState::default(), CounterReducer, NoEnv);

        store.send(CounterAction::Increment).await;

        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn effect_feedback_reaches_reducer() {
        let store = Store::new(CounterState::default(), CounterReducer, NoEnv);

        let handle = store.send(CounterAction::IncrementLater).await;
        handle.wait().await;

        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn send_and_wait_for_returns_completion_action() {
        let store = Store::new(CounterState::default(), CounterReducer, NoEnv);

        let result = store
            .send_and_wait_for(
                CounterAction::IncrementLater,
                |a| matches!(a, CounterAction::Incremented),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(result, CounterAction::Incremented);
    }

    #[tokio::test]
    async fn wait_with_timeout_times_out_on_slow_effects() {
        struct SlowReducer;

        impl Reducer for SlowReducer {
            type State = CounterState;
            type Action = CounterAction;
            type Environment = NoEnv;

            fn reduce(
                &self,
                _state: &mut Self::State,
                action: Self::Action,
                _env: &Self::Environment,
            ) -> SmallVec<[Effect<Self::Action>; 4]> {
                match action {
                    CounterAction::IncrementLater => smallvec![Effect::Delay {
                        duration: Duration::from_secs(60),
                        action: Box::new(CounterAction::Incremented),
                    }],
                    _ => SmallVec::new(),
                }
            }
        }

        let store = Store::new(CounterState::default(), SlowReducer, NoEnv);
        let handle = store.send(CounterAction::IncrementLater).await;

        let result = handle.wait_with_timeout(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(StoreError::Timeout)));
    }
}
