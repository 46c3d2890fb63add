//! # Bookflow Testing
//!
//! Testing utilities for bookflow reducers and stores:
//!
//! - [`ReducerTest`]: a fluent Given/When/Then harness for pure reducer tests
//! - [`assertions`]: helpers for asserting on returned effects
//! - [`mocks`]: deterministic environment pieces shared by every feature
//!   (a fixed clock; collaborator mocks live with their traits in the
//!   feature crates)
//!
//! ## Example
//!
//! ```ignore
//! use bookflow_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(CartReducer::new())
//!     .with_env(test_environment())
//!     .given_state(CartState::default())
//!     .when_action(CartAction::RemoveLine { line_id })
//!     .then_state(|state| assert!(state.cart.lines.is_empty()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of shared environment traits.
pub mod mocks {
    use bookflow_core::environment::Clock;
    use chrono::{DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making timestamp-sensitive assertions
    /// reproducible.
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

    /// Create a default fixed clock for tests (2025-06-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which should never
    /// happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::{FixedClock, test_clock};
