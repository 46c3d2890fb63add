//! # Bookflow Core
//!
//! Core traits and types for the bookflow booking-widget architecture.
//!
//! Every feature of the booking flow — the cart, the checkout state machine,
//! the activity wizard — is written as a *reducer*: a pure function from the
//! current state and an input action to the next state plus a list of effect
//! descriptions. Effects are values, not executions; the runtime store runs
//! them and feeds any resulting actions back into the reducer.
//!
//! ## Core Concepts
//!
//! - **State**: owned, `Clone`-able domain state for a feature
//! - **Action**: all possible inputs to a reducer (user intents and
//!   collaborator completions)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side-effect description (validator round-trip, checkout
//!   submission, delayed action)
//! - **Environment**: injected collaborator dependencies behind traits
//!
//! ## Example
//!
//! ```ignore
//! use bookflow_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = CartEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         env: &CartEnvironment,
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         match action {
//!             CartAction::RemoveLine { line_id } => {
//!                 state.cart.remove_line(&line_id);
//!                 SmallVec::new()
//!             }
//!             // ...
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types so feature crates need a single import.
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - the core trait for feature logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable without
/// rendering any UI or touching the network.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for feature logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: the domain state this reducer operates on
    /// - `Action`: the action type this reducer processes
    /// - `Environment`: the injected collaborator dependencies
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure transition that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place (all-or-nothing per action)
        /// 3. Returns effect descriptions for the runtime to execute
        ///
        /// Most actions produce no effects, so the return type is a
        /// `SmallVec` sized to keep the common case off the heap.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side-effect descriptions
///
/// Effects describe work to be performed by the runtime store. They are
/// values (not executions), composable, and carry the action type so that
/// completed async work can feed a follow-up action back into the reducer.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Boxed future produced by `Effect::Future`.
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the store.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another
        Sequential(Vec<Effect<Action>>),

        /// Dispatch an action after a delay (timeout checks, expiry sweeps)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation (collaborator round-trips)
        ///
        /// Resolves to `Option<Action>` - if `Some`, the action is fed back
        /// into the reducer.
        Future(EffectFuture<Action>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }
    }

    impl<Action: Send + 'static> Effect<Action> {
        /// Lift a child effect into a parent action space
        ///
        /// Used when a parent reducer embeds a child reducer (the booking
        /// flow embedding the cart): child effects keep working, but their
        /// completion actions arrive wrapped in the parent's action type.
        pub fn map<Parent, F>(self, f: F) -> Effect<Parent>
        where
            Parent: Send + 'static,
            F: Fn(Action) -> Parent + Clone + Send + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => Effect::Parallel(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Sequential(effects) => Effect::Sequential(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(future) => {
                    Effect::Future(Box::pin(async move { future.await.map(f) }))
                },
            }
        }
    }
}

/// Environment module - dependency injection traits
///
/// External dependencies are abstracted behind traits and injected via the
/// reducer's `Environment` parameter. Feature crates define their own
/// collaborator traits (validators, submitters, availability sources); the
/// one dependency every feature shares is time.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Production uses [`SystemClock`]; tests use a fixed clock so
    /// timestamps are deterministic.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// System clock - returns the real current time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::effect::Effect;

    #[derive(Debug, PartialEq)]
    enum Child {
        Done(u32),
    }

    #[derive(Debug, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[test]
    fn map_lifts_delay_actions() {
        let effect: Effect<Child> = Effect::Delay {
            duration: std::time::Duration::from_secs(1),
            action: Box::new(Child::Done(7)),
        };

        let mapped = effect.map(Parent::Child);
        match mapped {
            Effect::Delay { action, .. } => assert_eq!(*action, Parent::Child(Child::Done(7))),
            other => panic!("expected Delay, got {other:?}"),
        }
    }

    #[test]
    fn map_lifts_future_actions() {
        let effect: Effect<Child> =
            Effect::Future(Box::pin(async { Some(Child::Done(3)) }));

        let mapped = effect.map(Parent::Child);
        let Effect::Future(future) = mapped else {
            panic!("expected Future");
        };
        let action = tokio_test::block_on(future);
        assert_eq!(action, Some(Parent::Child(Child::Done(3))));
    }

    #[test]
    fn merge_and_chain_wrap_children() {
        let merged: Effect<Child> = Effect::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(merged, Effect::Parallel(ref e) if e.len() == 2));

        let chained: Effect<Child> = Effect::chain(vec![Effect::None]);
        assert!(matches!(chained, Effect::Sequential(ref e) if e.len() == 1));
    }
}
