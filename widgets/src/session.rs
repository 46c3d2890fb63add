//! Shared booking session behind every widget skin.
//!
//! Owns the engine store and translates presentation intents into flow
//! actions. Request/response operations (discounts, submission) use the
//! store's action broadcast to wait for their completion action, so callers
//! get a plain `Result`-shaped outcome back.

use bookflow_engine::{
    BookingFlowReducer, BookingReference, CartAction, CheckoutFailure, ContactDetails,
    DiscountRejection, DraftValidationError, Experience, FlowAction, FlowEnvironment, FlowState,
    LineId, PaymentDetails, Stage, TicketSelection, TicketType, TicketTypeId, TimeSlot, Totals,
};
use bookflow_runtime::{Store, StoreError};
use chrono::{NaiveDate, NaiveTime};
use std::time::Duration;

/// The engine store every widget drives
pub type FlowStore = Store<FlowState, FlowAction, FlowEnvironment, BookingFlowReducer>;

/// How long a widget waits for a collaborator completion before giving up
const COMPLETION_WAIT: Duration = Duration::from_secs(60);

/// Per-ticket-type quantity policy, the one declared difference between
/// widget variants' ticket pickers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantityPolicy {
    /// Highest quantity a single ticket type may reach, if bounded
    pub max_per_ticket_type: Option<u32>,
}

impl QuantityPolicy {
    /// Calendar/list behavior: quantities clamp to 0–10 per ticket type
    pub const CLAMPED: Self = Self {
        max_per_ticket_type: Some(10),
    };

    /// Quick-book behavior: unbounded one-unit adds
    pub const UNBOUNDED: Self = Self {
        max_per_ticket_type: None,
    };

    /// Clamps a desired quantity to the policy's range
    #[must_use]
    pub fn clamp(&self, desired: u32) -> u32 {
        self.max_per_ticket_type.map_or(desired, |max| desired.min(max))
    }
}

/// Outcome of a discount application
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscountOutcome {
    /// The validator accepted the code; totals already reflect it
    Applied(Totals),
    /// The validator refused the code; the cart is unchanged
    Rejected(DiscountRejection),
}

/// Outcome of a checkout submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Booking confirmed
    Confirmed(BookingReference),
    /// Submission failed; the draft is retained for retry
    Failed(CheckoutFailure),
    /// Client-local validation refused the draft before submission
    Invalid(DraftValidationError),
}

/// Shared facade over the engine store
pub struct BookingSession {
    store: FlowStore,
    policy: QuantityPolicy,
}

impl BookingSession {
    /// Creates a session with a fresh flow state
    #[must_use]
    pub fn new(env: FlowEnvironment, policy: QuantityPolicy) -> Self {
        Self {
            store: Store::new(FlowState::new(), BookingFlowReducer::new(), env),
            policy,
        }
    }

    /// The session's quantity policy
    #[must_use]
    pub const fn policy(&self) -> QuantityPolicy {
        self.policy
    }

    /// Picks an experience and loads slots for the given date
    pub async fn select_experience(&self, experience: Experience, date: NaiveDate) {
        let _ = self
            .store
            .send_and_wait_for(
                FlowAction::SelectExperience { experience, date },
                |a| {
                    matches!(
                        a,
                        FlowAction::SlotsLoaded { .. } | FlowAction::SlotsUnavailable { .. }
                    )
                },
                COMPLETION_WAIT,
            )
            .await;
    }

    /// Changes the selected date and reloads slots
    pub async fn select_date(&self, date: NaiveDate) {
        let _ = self
            .store
            .send_and_wait_for(
                FlowAction::SelectDate { date },
                |a| {
                    matches!(
                        a,
                        FlowAction::SlotsLoaded { .. } | FlowAction::SlotsUnavailable { .. }
                    )
                },
                COMPLETION_WAIT,
            )
            .await;
    }

    /// Picks a time slot; sold-out slots are refused by the engine
    pub async fn select_time(&self, time: NaiveTime) {
        self.store.send(FlowAction::SelectTimeSlot { time }).await;
    }

    /// Slots loaded for the selected date
    pub async fn slots(&self) -> Vec<TimeSlot> {
        self.store.state(|s| s.slots.clone()).await
    }

    /// Sets the quantity of one ticket type, clamped by policy
    ///
    /// Computes the difference against the cart and either appends fresh
    /// lines or removes the newest lines of that type.
    pub async fn set_quantity(&self, ticket_type: &TicketType, desired: u32) {
        let desired = self.policy.clamp(desired);
        let (current, newest_first): (u32, Vec<LineId>) = self
            .store
            .state(|s| {
                let current = s.cart.cart.quantity_of(&ticket_type.id);
                let mut ids: Vec<LineId> = s
                    .cart
                    .cart
                    .lines
                    .iter()
                    .filter(|line| line.ticket_type_id == ticket_type.id)
                    .map(|line| line.line_id)
                    .collect();
                ids.reverse();
                (current, ids)
            })
            .await;

        if desired > current {
            self.store
                .send(FlowAction::Cart(CartAction::AddTickets {
                    ticket_type: ticket_type.clone(),
                    quantity: desired - current,
                    per_line_promo_code: None,
                }))
                .await;
        } else {
            for line_id in newest_first.into_iter().take((current - desired) as usize) {
                self.store
                    .send(FlowAction::Cart(CartAction::RemoveLine { line_id }))
                    .await;
            }
        }
    }

    /// Appends one unit of a ticket type at the given price
    ///
    /// Used by the quick-book skin, which may bake a per-type promo into
    /// the price before lines are created.
    pub async fn add_unit(&self, ticket_type: TicketType, per_line_promo_code: Option<String>) {
        self.store
            .send(FlowAction::Cart(CartAction::AddTickets {
                ticket_type,
                quantity: 1,
                per_line_promo_code,
            }))
            .await;
    }

    /// Removes one cart line
    pub async fn remove_line(&self, line_id: LineId) {
        self.store
            .send(FlowAction::Cart(CartAction::RemoveLine { line_id }))
            .await;
    }

    /// Applies a promo code and waits for the validator's verdict
    pub async fn apply_promo_code(&self, code: impl Into<String>) -> DiscountOutcome {
        let completion = self
            .store
            .send_and_wait_for(
                FlowAction::Cart(CartAction::ApplyPromoCode { code: code.into() }),
                |a| {
                    matches!(
                        a,
                        FlowAction::Cart(
                            CartAction::PromoCodeAccepted { .. }
                                | CartAction::PromoCodeRejected { .. }
                        )
                    )
                },
                COMPLETION_WAIT,
            )
            .await;
        self.discount_outcome(completion).await
    }

    /// Applies a gift card and waits for the validator's verdict
    pub async fn apply_gift_card(&self, code: impl Into<String>) -> DiscountOutcome {
        let completion = self
            .store
            .send_and_wait_for(
                FlowAction::Cart(CartAction::ApplyGiftCard { code: code.into() }),
                |a| {
                    matches!(
                        a,
                        FlowAction::Cart(
                            CartAction::GiftCardAccepted { .. }
                                | CartAction::GiftCardRejected { .. }
                        )
                    )
                },
                COMPLETION_WAIT,
            )
            .await;
        self.discount_outcome(completion).await
    }

    async fn discount_outcome(
        &self,
        completion: Result<FlowAction, StoreError>,
    ) -> DiscountOutcome {
        match completion {
            Ok(FlowAction::Cart(
                CartAction::PromoCodeRejected { rejection, .. }
                | CartAction::GiftCardRejected { rejection, .. },
            )) => DiscountOutcome::Rejected(rejection),
            Ok(_) => DiscountOutcome::Applied(self.totals().await),
            Err(_) => DiscountOutcome::Rejected(DiscountRejection::Unavailable),
        }
    }

    /// Clears the applied promo code
    pub async fn remove_promo_code(&self) {
        self.store
            .send(FlowAction::Cart(CartAction::RemovePromoCode))
            .await;
    }

    /// Clears the applied gift card
    pub async fn remove_gift_card(&self) {
        self.store
            .send(FlowAction::Cart(CartAction::RemoveGiftCard))
            .await;
    }

    /// Advances to cart review
    pub async fn proceed_to_cart(&self) {
        self.store.send(FlowAction::ProceedToCart).await;
    }

    /// Advances to checkout details
    pub async fn proceed_to_checkout(&self) {
        self.store.send(FlowAction::ProceedToCheckout).await;
    }

    /// Records contact fields
    pub async fn update_contact(&self, contact: ContactDetails) {
        self.store.send(FlowAction::UpdateContact { contact }).await;
    }

    /// Records payment fields
    pub async fn update_payment(&self, payment: PaymentDetails) {
        self.store.send(FlowAction::UpdatePayment { payment }).await;
    }

    /// Validates the draft and submits it, waiting for the outcome
    ///
    /// Client-local validation failures short-circuit before any round-trip,
    /// mirroring the engine's own guard; the reducer still records the error
    /// for display.
    pub async fn submit(&self) -> SubmitOutcome {
        let draft = self.store.state(FlowState::draft).await;
        let Some(draft) = draft else {
            return SubmitOutcome::Failed(CheckoutFailure::Backend {
                message: "booking selection is incomplete".to_string(),
            });
        };
        if let Err(error) = draft.validate() {
            self.store.send(FlowAction::SubmitCheckout).await;
            return SubmitOutcome::Invalid(error);
        }

        let completion = self
            .store
            .send_and_wait_for(
                FlowAction::SubmitCheckout,
                |a| {
                    matches!(
                        a,
                        FlowAction::CheckoutSucceeded { .. } | FlowAction::CheckoutFailed { .. }
                    )
                },
                COMPLETION_WAIT,
            )
            .await;

        match completion {
            Ok(FlowAction::CheckoutSucceeded { reference, .. }) => {
                SubmitOutcome::Confirmed(reference)
            },
            Ok(FlowAction::CheckoutFailed { failure, .. }) => SubmitOutcome::Failed(failure),
            // The engine bounds the submission itself; not hearing back at
            // all is treated the same as an elapsed submission.
            _ => SubmitOutcome::Failed(CheckoutFailure::OutcomeUnknown),
        }
    }

    /// Returns from a failed submission to the details step
    pub async fn try_again(&self) {
        self.store.send(FlowAction::TryAgain).await;
    }

    /// Steps one stage back
    pub async fn go_back(&self) {
        self.store.send(FlowAction::GoBack).await;
    }

    /// Resets the whole session to browsing
    pub async fn start_over(&self) {
        self.store.send(FlowAction::StartOver).await;
    }

    /// Current monetary summary
    pub async fn totals(&self) -> Totals {
        self.store.state(|s| s.cart.totals()).await
    }

    /// Current stage of the flow
    pub async fn stage(&self) -> Stage {
        self.store.state(|s| s.stage.clone()).await
    }

    /// Current quantity of one ticket type
    pub async fn quantity_of(&self, ticket_type_id: &TicketTypeId) -> u32 {
        let id = *ticket_type_id;
        self.store.state(move |s| s.cart.cart.quantity_of(&id)).await
    }

    /// Current per-type selections, for rendering quantity steppers
    pub async fn selections(&self) -> Vec<TicketSelection> {
        self.store.state(|s| s.cart.cart.selections()).await
    }
}
