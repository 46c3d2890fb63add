//! Scripted collaborator mocks for tests.
//!
//! Deterministic stand-ins for the validator, submitter, and availability
//! contracts. Scripted mocks replay a queue of outcomes in order; the
//! hanging submitter never resolves, for exercising the submission timeout.

use crate::availability::{AvailabilityFuture, AvailabilitySource};
use crate::submitter::{CheckoutSubmitter, SubmitFuture};
use crate::types::{
    BookingConfirmation, BookingDraft, CheckoutFailure, ExperienceId, TimeSlot,
};
use crate::validator::{
    GiftCardGrant, GiftCardValidator, PromoCodeValidator, PromoGrant, ValidatorError,
    ValidatorFuture, ValidatorResult,
};
use crate::money::Money;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

fn pop_front<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    queue
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .pop_front()
}

/// Promo validator replaying a scripted queue of outcomes
///
/// Once the script is exhausted, further calls report the validator as
/// unavailable.
#[derive(Debug)]
pub struct ScriptedPromoValidator {
    outcomes: Mutex<VecDeque<ValidatorResult<PromoGrant>>>,
}

impl ScriptedPromoValidator {
    /// Creates a validator that replays `outcomes` in order
    #[must_use]
    pub fn new(outcomes: Vec<ValidatorResult<PromoGrant>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(outcomes: Vec<ValidatorResult<PromoGrant>>) -> Arc<dyn PromoCodeValidator> {
        Arc::new(Self::new(outcomes))
    }
}

impl PromoCodeValidator for ScriptedPromoValidator {
    fn validate(&self, _code: &str, _subtotal: Money) -> ValidatorFuture<PromoGrant> {
        let outcome = pop_front(&self.outcomes).unwrap_or_else(|| {
            Err(ValidatorError::Unavailable("script exhausted".to_string()))
        });
        Box::pin(async move { outcome })
    }
}

/// Gift card validator replaying a scripted queue of outcomes
#[derive(Debug)]
pub struct ScriptedGiftCardValidator {
    outcomes: Mutex<VecDeque<ValidatorResult<GiftCardGrant>>>,
}

impl ScriptedGiftCardValidator {
    /// Creates a validator that replays `outcomes` in order
    #[must_use]
    pub fn new(outcomes: Vec<ValidatorResult<GiftCardGrant>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(outcomes: Vec<ValidatorResult<GiftCardGrant>>) -> Arc<dyn GiftCardValidator> {
        Arc::new(Self::new(outcomes))
    }
}

impl GiftCardValidator for ScriptedGiftCardValidator {
    fn validate(&self, _code: &str, _amount_due: Money) -> ValidatorFuture<GiftCardGrant> {
        let outcome = pop_front(&self.outcomes).unwrap_or_else(|| {
            Err(ValidatorError::Unavailable("script exhausted".to_string()))
        });
        Box::pin(async move { outcome })
    }
}

/// Checkout submitter replaying a scripted queue of outcomes
///
/// Once the script is exhausted, further submissions report a backend error.
#[derive(Debug)]
pub struct ScriptedSubmitter {
    outcomes: Mutex<VecDeque<Result<BookingConfirmation, CheckoutFailure>>>,
}

impl ScriptedSubmitter {
    /// Creates a submitter that replays `outcomes` in order
    #[must_use]
    pub fn new(outcomes: Vec<Result<BookingConfirmation, CheckoutFailure>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(
        outcomes: Vec<Result<BookingConfirmation, CheckoutFailure>>,
    ) -> Arc<dyn CheckoutSubmitter> {
        Arc::new(Self::new(outcomes))
    }
}

impl CheckoutSubmitter for ScriptedSubmitter {
    fn submit(&self, _draft: &BookingDraft) -> SubmitFuture {
        let outcome = pop_front(&self.outcomes).unwrap_or_else(|| {
            Err(CheckoutFailure::Backend {
                message: "script exhausted".to_string(),
            })
        });
        Box::pin(async move { outcome })
    }
}

/// Checkout submitter whose future never resolves
///
/// Exercises the submission timeout: without the bound, this would leave the
/// flow in `Processing` forever.
#[derive(Clone, Debug, Default)]
pub struct HangingSubmitter;

impl HangingSubmitter {
    /// Creates a new hanging submitter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn CheckoutSubmitter> {
        Arc::new(Self::new())
    }
}

impl CheckoutSubmitter for HangingSubmitter {
    fn submit(&self, _draft: &BookingDraft) -> SubmitFuture {
        Box::pin(std::future::pending())
    }
}

/// Availability source returning a fixed slot list for every lookup
#[derive(Clone, Debug, Default)]
pub struct FixedAvailability {
    slots: Vec<TimeSlot>,
}

impl FixedAvailability {
    /// Creates a source returning `slots` for every `(experience, date)`
    #[must_use]
    pub const fn new(slots: Vec<TimeSlot>) -> Self {
        Self { slots }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(slots: Vec<TimeSlot>) -> Arc<dyn AvailabilitySource> {
        Arc::new(Self::new(slots))
    }
}

impl AvailabilitySource for FixedAvailability {
    fn slots(&self, _experience_id: ExperienceId, _date: NaiveDate) -> AvailabilityFuture {
        let slots = self.slots.clone();
        Box::pin(async move { Ok(slots) })
    }
}
