//! Checkout flow state machine.
//!
//! One booking flow shared by every widget variant:
//!
//! ```text
//! Browsing → SlotSelection → TicketSelection → CartReview
//!          → CheckoutDetails → Processing → Success | Failed
//! ```
//!
//! `Failed` is recoverable ("Try Again" returns to the details step with the
//! draft intact); `Success` holds until an explicit start-over. Guards:
//! a slot must be loaded and available to leave slot selection, the cart
//! must hold at least one line to advance past ticket selection, and
//! contact/payment fields must validate before submission.
//!
//! The cart reducer is embedded as a child: cart actions arrive wrapped in
//! [`FlowAction::Cart`] and cart effects are lifted back into the flow's
//! action space.

use crate::cart::{CartAction, CartEnvironment, CartReducer, CartState};
use crate::submitter::CheckoutSubmitter;
use crate::availability::AvailabilitySource;
use crate::types::{
    BookingDraft, BookingReference, CheckoutFailure, ContactDetails, DraftValidationError,
    Experience, PaymentDetails, TimeSlot,
};
use bookflow_core::{
    DateTime, SmallVec, Utc, effect::Effect, environment::Clock, reducer::Reducer, smallvec,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a checkout submission round-trip
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment dependencies for the booking flow reducer
#[derive(Clone)]
pub struct FlowEnvironment {
    /// Clock for confirmation timestamps
    pub clock: Arc<dyn Clock>,
    /// Availability source collaborator
    pub availability: Arc<dyn AvailabilitySource>,
    /// Checkout submitter collaborator
    pub submitter: Arc<dyn CheckoutSubmitter>,
    /// Environment for the embedded cart reducer
    pub cart: CartEnvironment,
    /// Bound on the submission round-trip; elapse means outcome unknown
    pub submit_timeout: Duration,
}

impl FlowEnvironment {
    /// Creates a new `FlowEnvironment` with the default submit timeout
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        availability: Arc<dyn AvailabilitySource>,
        submitter: Arc<dyn CheckoutSubmitter>,
        cart: CartEnvironment,
    ) -> Self {
        Self {
            clock,
            availability,
            submitter,
            cart,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    /// Overrides the submission timeout
    #[must_use]
    pub const fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }
}

/// Where the customer is in the booking flow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Browsing the catalog; nothing selected yet
    Browsing,
    /// Experience chosen; picking a date and time slot
    SlotSelection,
    /// Slot chosen; picking ticket quantities
    TicketSelection,
    /// Reviewing cart lines and discounts
    CartReview,
    /// Entering contact and payment details
    CheckoutDetails,
    /// Submission in flight; the submit control is disabled
    Processing,
    /// Booking confirmed; holds until an explicit start-over
    Success {
        /// Reference for the created booking
        reference: BookingReference,
        /// When the confirmation arrived
        confirmed_at: DateTime<Utc>,
    },
    /// Submission failed; recoverable via "Try Again"
    Failed {
        /// What went wrong
        failure: CheckoutFailure,
    },
}

/// State for the booking flow reducer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowState {
    /// Current stage of the state machine
    pub stage: Stage,
    /// Selected experience
    pub experience: Option<Experience>,
    /// Selected date
    pub date: Option<NaiveDate>,
    /// Selected time slot
    pub time: Option<NaiveTime>,
    /// Slots loaded for the selected date
    pub slots: Vec<TimeSlot>,
    /// A slot load is outstanding
    pub slots_loading: bool,
    /// Slot load failure message, for display
    pub slot_error: Option<String>,
    /// Customer contact fields
    pub contact: ContactDetails,
    /// Customer payment fields
    pub payment: PaymentDetails,
    /// Client-local validation failure blocking submission
    pub last_validation_error: Option<DraftValidationError>,
    /// Embedded cart state
    pub cart: CartState,
    /// Flow epoch; bumped on back/reset/date-change to drop stale completions
    pub epoch: u64,
}

impl FlowState {
    /// Creates a fresh flow in the browsing stage
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage: Stage::Browsing,
            experience: None,
            date: None,
            time: None,
            slots: Vec::new(),
            slots_loading: false,
            slot_error: None,
            contact: ContactDetails::default(),
            payment: PaymentDetails::default(),
            last_validation_error: None,
            cart: CartState::new(),
            epoch: 0,
        }
    }

    /// Builds the booking draft for submission
    ///
    /// Returns `None` unless an experience, date, and time are all selected.
    #[must_use]
    pub fn draft(&self) -> Option<BookingDraft> {
        let experience = self.experience.as_ref()?;
        Some(BookingDraft {
            experience_id: experience.id,
            experience_name: experience.name.clone(),
            date: self.date?,
            time: self.time?,
            cart: self.cart.cart.clone(),
            contact: self.contact.clone(),
            payment: self.payment.clone(),
        })
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions for the booking flow reducer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FlowAction {
    /// Pick an experience and an initial date (Browsing → `SlotSelection`)
    SelectExperience {
        /// The chosen experience
        experience: Experience,
        /// Initial date to load slots for
        date: NaiveDate,
    },

    /// Change the date within slot selection; reloads slots
    SelectDate {
        /// The new date
        date: NaiveDate,
    },

    /// Completion: slots arrived from the availability source
    SlotsLoaded {
        /// Date the slots belong to
        date: NaiveDate,
        /// Ordered slot list
        slots: Vec<TimeSlot>,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Completion: the availability source failed
    SlotsUnavailable {
        /// Failure message for display
        message: String,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Pick a time slot (`SlotSelection` → `TicketSelection`); sold-out slots refuse
    SelectTimeSlot {
        /// The chosen time
        time: NaiveTime,
    },

    /// Advance to cart review; requires at least one cart line
    ProceedToCart,

    /// Advance to checkout details; requires at least one cart line
    ProceedToCheckout,

    /// Record contact fields
    UpdateContact {
        /// New contact fields
        contact: ContactDetails,
    },

    /// Record payment fields
    UpdatePayment {
        /// New payment fields
        payment: PaymentDetails,
    },

    /// Validate the draft and submit it (`CheckoutDetails` → Processing)
    SubmitCheckout,

    /// Completion: the submitter confirmed the booking
    CheckoutSucceeded {
        /// Reference for the created booking
        reference: BookingReference,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Completion: the submitter declined or errored, or the call timed out
    CheckoutFailed {
        /// What went wrong
        failure: CheckoutFailure,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Return from Failed to the details step with the draft intact
    TryAgain,

    /// Step one stage back, abandoning in-flight loads
    GoBack,

    /// Reset the whole flow to browsing ("start over" / exit confirmed)
    StartOver,

    /// Embedded cart action
    Cart(CartAction),
}

/// Reducer for the booking flow
#[derive(Clone, Debug, Default)]
pub struct BookingFlowReducer {
    cart: CartReducer,
}

impl BookingFlowReducer {
    /// Creates a new `BookingFlowReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cart: CartReducer::new(),
        }
    }

    /// Effect loading slots for `(experience, date)` under the given epoch
    fn load_slots(
        env: &FlowEnvironment,
        experience: &Experience,
        date: NaiveDate,
        epoch: u64,
    ) -> Effect<FlowAction> {
        let availability = Arc::clone(&env.availability);
        let experience_id = experience.id;

        Effect::Future(Box::pin(async move {
            match availability.slots(experience_id, date).await {
                Ok(slots) => Some(FlowAction::SlotsLoaded { date, slots, epoch }),
                Err(error) => {
                    tracing::error!(%experience_id, %date, %error, "slot load failed");
                    Some(FlowAction::SlotsUnavailable {
                        message: error.to_string(),
                        epoch,
                    })
                },
            }
        }))
    }
}

impl Reducer for BookingFlowReducer {
    type State = FlowState;
    type Action = FlowAction;
    type Environment = FlowEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per flow transition
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Slot selection ==========
            FlowAction::SelectExperience { experience, date } => {
                if state.stage != Stage::Browsing {
                    tracing::warn!(stage = ?state.stage, "experience selection outside browsing ignored");
                    return SmallVec::new();
                }
                state.epoch += 1;
                state.stage = Stage::SlotSelection;
                state.date = Some(date);
                state.time = None;
                state.slots.clear();
                state.slots_loading = true;
                state.slot_error = None;

                let effect = Self::load_slots(env, &experience, date, state.epoch);
                state.experience = Some(experience);
                smallvec![effect]
            },

            FlowAction::SelectDate { date } => {
                if state.stage != Stage::SlotSelection {
                    tracing::warn!(stage = ?state.stage, "date change outside slot selection ignored");
                    return SmallVec::new();
                }
                let Some(experience) = state.experience.clone() else {
                    return SmallVec::new();
                };
                // New date invalidates any slot response still in flight.
                state.epoch += 1;
                state.date = Some(date);
                state.time = None;
                state.slots.clear();
                state.slots_loading = true;
                state.slot_error = None;

                smallvec![Self::load_slots(env, &experience, date, state.epoch)]
            },

            FlowAction::SlotsLoaded { date, slots, epoch } => {
                if epoch != state.epoch {
                    tracing::debug!(%date, "stale slot response dropped");
                    return SmallVec::new();
                }
                state.slots = slots;
                state.slots_loading = false;
                SmallVec::new()
            },

            FlowAction::SlotsUnavailable { message, epoch } => {
                if epoch != state.epoch {
                    return SmallVec::new();
                }
                state.slots_loading = false;
                state.slot_error = Some(message);
                SmallVec::new()
            },

            FlowAction::SelectTimeSlot { time } => {
                if state.stage != Stage::SlotSelection {
                    tracing::warn!(stage = ?state.stage, "slot selection outside slot stage ignored");
                    return SmallVec::new();
                }
                let available = state
                    .slots
                    .iter()
                    .any(|slot| slot.time == time && slot.is_available);
                if !available {
                    tracing::warn!(%time, "unavailable slot refused");
                    return SmallVec::new();
                }
                state.time = Some(time);
                state.stage = Stage::TicketSelection;
                SmallVec::new()
            },

            // ========== Advancing ==========
            FlowAction::ProceedToCart => {
                if state.stage != Stage::TicketSelection {
                    return SmallVec::new();
                }
                if state.cart.cart.is_empty() {
                    tracing::debug!("cannot review an empty cart");
                    return SmallVec::new();
                }
                state.stage = Stage::CartReview;
                SmallVec::new()
            },

            FlowAction::ProceedToCheckout => {
                if state.stage != Stage::CartReview {
                    return SmallVec::new();
                }
                if state.cart.cart.is_empty() {
                    tracing::debug!("cannot check out an empty cart");
                    return SmallVec::new();
                }
                state.stage = Stage::CheckoutDetails;
                SmallVec::new()
            },

            // ========== Checkout details ==========
            FlowAction::UpdateContact { contact } => {
                state.contact = contact;
                state.last_validation_error = None;
                SmallVec::new()
            },

            FlowAction::UpdatePayment { payment } => {
                state.payment = payment;
                state.last_validation_error = None;
                SmallVec::new()
            },

            FlowAction::SubmitCheckout => {
                if state.stage != Stage::CheckoutDetails {
                    // Processing included: one submission in flight at a time.
                    tracing::debug!(stage = ?state.stage, "submit outside details step ignored");
                    return SmallVec::new();
                }
                let Some(draft) = state.draft() else {
                    tracing::warn!("submit without a complete slot selection ignored");
                    return SmallVec::new();
                };
                if let Err(error) = draft.validate() {
                    tracing::debug!(%error, "draft validation failed");
                    state.last_validation_error = Some(error);
                    return SmallVec::new();
                }

                state.stage = Stage::Processing;
                state.last_validation_error = None;

                let submitter = Arc::clone(&env.submitter);
                let timeout = env.submit_timeout;
                let epoch = state.epoch;

                smallvec![Effect::Future(Box::pin(async move {
                    match tokio::time::timeout(timeout, submitter.submit(&draft)).await {
                        Ok(Ok(confirmation)) => Some(FlowAction::CheckoutSucceeded {
                            reference: confirmation.booking_reference,
                            epoch,
                        }),
                        Ok(Err(failure)) => Some(FlowAction::CheckoutFailed { failure, epoch }),
                        Err(_) => {
                            tracing::error!("checkout submission timed out; outcome unknown");
                            Some(FlowAction::CheckoutFailed {
                                failure: CheckoutFailure::OutcomeUnknown,
                                epoch,
                            })
                        },
                    }
                }))]
            },

            FlowAction::CheckoutSucceeded { reference, epoch } => {
                if epoch != state.epoch || state.stage != Stage::Processing {
                    tracing::debug!(%reference, "stale checkout confirmation dropped");
                    return SmallVec::new();
                }
                tracing::info!(%reference, "booking confirmed");
                state.stage = Stage::Success {
                    reference,
                    confirmed_at: env.clock.now(),
                };
                SmallVec::new()
            },

            FlowAction::CheckoutFailed { failure, epoch } => {
                if epoch != state.epoch || state.stage != Stage::Processing {
                    return SmallVec::new();
                }
                tracing::warn!(%failure, "checkout failed; draft retained for retry");
                state.stage = Stage::Failed { failure };
                SmallVec::new()
            },

            FlowAction::TryAgain => {
                if !matches!(state.stage, Stage::Failed { .. }) {
                    return SmallVec::new();
                }
                state.stage = Stage::CheckoutDetails;
                SmallVec::new()
            },

            // ========== Backing out ==========
            FlowAction::GoBack => {
                let previous = match &state.stage {
                    Stage::SlotSelection => Some(Stage::Browsing),
                    Stage::TicketSelection => Some(Stage::SlotSelection),
                    Stage::CartReview => Some(Stage::TicketSelection),
                    Stage::CheckoutDetails => Some(Stage::CartReview),
                    Stage::Failed { .. } => Some(Stage::CheckoutDetails),
                    // Nothing to go back to, or a submission is in flight.
                    Stage::Browsing | Stage::Processing | Stage::Success { .. } => None,
                };
                let Some(previous) = previous else {
                    return SmallVec::new();
                };
                // Abandon whatever round-trip the departed stage started.
                state.epoch += 1;
                state.slots_loading = false;
                if previous == Stage::Browsing {
                    state.experience = None;
                    state.date = None;
                    state.time = None;
                    state.slots.clear();
                }
                state.stage = previous;
                SmallVec::new()
            },

            FlowAction::StartOver => {
                let cart_effects =
                    self.cart
                        .reduce(&mut state.cart, CartAction::Reset, &env.cart);
                debug_assert!(cart_effects.is_empty());

                *state = FlowState {
                    cart: std::mem::take(&mut state.cart),
                    epoch: state.epoch + 1,
                    ..FlowState::new()
                };
                SmallVec::new()
            },

            // ========== Embedded cart ==========
            FlowAction::Cart(action) => {
                let effects = self.cart.reduce(&mut state.cart, action, &env.cart);
                effects
                    .into_iter()
                    .map(|effect| effect.map(FlowAction::Cart))
                    .collect()
            },
        }
    }
}
