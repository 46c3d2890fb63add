//! Cart/pricing reducer.
//!
//! Maintains cart state and computes monetary totals deterministically from
//! ticket selections and at most one promo code plus one gift card. All
//! mutations are all-or-nothing per action; a failed discount application
//! leaves the cart bit-identical to before the attempt.
//!
//! Discount validation is asynchronous: `ApplyPromoCode` / `ApplyGiftCard`
//! dispatch a validator effect and the outcome re-enters the reducer as an
//! accepted/rejected completion action. Completions are tagged with the
//! session epoch at dispatch time; a completion from before a reset is
//! stale and dropped, so an abandoned session can never be resurrected by a
//! late response.

use crate::money::Money;
use crate::types::{AppliedGiftCard, AppliedPromoCode, Cart, LineId, PromoKind, TicketType, Totals};
use crate::validator::{DiscountRejection, GiftCardValidator, PromoCodeValidator};
use bookflow_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Environment dependencies for the cart reducer
#[derive(Clone)]
pub struct CartEnvironment {
    /// Promo code validator collaborator
    pub promo_validator: Arc<dyn PromoCodeValidator>,
    /// Gift card validator collaborator
    pub gift_card_validator: Arc<dyn GiftCardValidator>,
}

impl CartEnvironment {
    /// Creates a new `CartEnvironment`
    #[must_use]
    pub fn new(
        promo_validator: Arc<dyn PromoCodeValidator>,
        gift_card_validator: Arc<dyn GiftCardValidator>,
    ) -> Self {
        Self {
            promo_validator,
            gift_card_validator,
        }
    }
}

/// State for the cart reducer
///
/// The in-flight flags are the flow's only backpressure: while a validation
/// round-trip is outstanding, re-triggering the same operation is a no-op
/// (the presentation shows an "Applying…" control in that window).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CartState {
    /// The cart aggregate
    pub cart: Cart,
    /// A promo validation request is outstanding
    pub promo_request_in_flight: bool,
    /// A gift card validation request is outstanding
    pub gift_card_request_in_flight: bool,
    /// Why the most recent discount attempt failed, for display
    pub last_rejection: Option<DiscountRejection>,
    /// Session epoch; bumped on reset to invalidate in-flight completions
    pub epoch: u64,
}

impl CartState {
    /// Creates a new empty cart state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the monetary summary from the current cart
    ///
    /// Pure read; see [`Cart::totals`].
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.cart.totals()
    }
}

/// Actions for the cart reducer
///
/// User intents plus validator completion actions. Completions carry the
/// epoch captured at dispatch time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CartAction {
    /// Append `quantity` new lines at the ticket type's current unit price
    ///
    /// Quantity 0 is a no-op, not an error. In the quick-book variant the
    /// unit price may already carry a per-type promo, recorded in
    /// `per_line_promo_code`.
    AddTickets {
        /// Ticket type to add (price is the post-promo unit price)
        ticket_type: TicketType,
        /// Number of lines to append
        quantity: u32,
        /// Promo code baked into the unit price, if any
        per_line_promo_code: Option<String>,
    },

    /// Remove exactly one line; absent ids are a no-op
    RemoveLine {
        /// Line to remove
        line_id: LineId,
    },

    /// Look up a promo code with the validator collaborator
    ApplyPromoCode {
        /// Code as entered by the customer
        code: String,
    },

    /// Completion: the validator accepted the promo code
    PromoCodeAccepted {
        /// Normalized code
        code: String,
        /// Granted discount
        kind: PromoKind,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Completion: the validator refused the promo code
    PromoCodeRejected {
        /// Code as entered
        code: String,
        /// Why it was refused
        rejection: DiscountRejection,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Clear the applied promo code; always succeeds
    RemovePromoCode,

    /// Look up a gift card with the validator collaborator
    ApplyGiftCard {
        /// Code as entered by the customer
        code: String,
    },

    /// Completion: the validator accepted the gift card
    GiftCardAccepted {
        /// Normalized code
        code: String,
        /// Remaining stored value
        balance: Money,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Completion: the validator refused the gift card
    GiftCardRejected {
        /// Code as entered
        code: String,
        /// Why it was refused
        rejection: DiscountRejection,
        /// Epoch at dispatch time
        epoch: u64,
    },

    /// Clear the applied gift card; always succeeds
    RemoveGiftCard,

    /// Clear all lines and applied discounts ("start over")
    Reset,
}

/// Reducer for the cart
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per cart operation
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Lines ==========
            CartAction::AddTickets {
                ticket_type,
                quantity,
                per_line_promo_code,
            } => {
                if quantity == 0 {
                    return SmallVec::new();
                }
                state
                    .cart
                    .add_lines(&ticket_type, quantity, per_line_promo_code.as_deref());
                tracing::debug!(
                    ticket_type = %ticket_type.name,
                    quantity,
                    subtotal = %state.cart.subtotal(),
                    "tickets added"
                );
                SmallVec::new()
            },

            CartAction::RemoveLine { line_id } => {
                if !state.cart.remove_line(&line_id) {
                    tracing::debug!(%line_id, "remove for absent line ignored");
                }
                SmallVec::new()
            },

            // ========== Promo code ==========
            CartAction::ApplyPromoCode { code } => {
                if state.promo_request_in_flight {
                    tracing::debug!("promo validation already in flight");
                    return SmallVec::new();
                }
                state.promo_request_in_flight = true;
                state.last_rejection = None;

                let validator = Arc::clone(&env.promo_validator);
                let subtotal = state.cart.subtotal();
                let epoch = state.epoch;

                smallvec![Effect::Future(Box::pin(async move {
                    match validator.validate(&code, subtotal).await {
                        Ok(grant) => Some(CartAction::PromoCodeAccepted {
                            code: grant.code,
                            kind: grant.kind,
                            epoch,
                        }),
                        Err(error) => {
                            tracing::warn!(code = %code, %error, "promo code refused");
                            Some(CartAction::PromoCodeRejected {
                                code,
                                rejection: error.into(),
                                epoch,
                            })
                        },
                    }
                }))]
            },

            CartAction::PromoCodeAccepted { code, kind, epoch } => {
                if epoch != state.epoch {
                    tracing::debug!(code = %code, "stale promo completion dropped");
                    return SmallVec::new();
                }
                state.promo_request_in_flight = false;
                state.last_rejection = None;
                if let Some(previous) = state.cart.applied_promo_code.take() {
                    // Observed widget behavior: a new code replaces the old
                    // one without complaint.
                    tracing::debug!(old = %previous.code, new = %code, "promo code replaced");
                }
                state.cart.applied_promo_code = Some(AppliedPromoCode { code, kind });
                SmallVec::new()
            },

            CartAction::PromoCodeRejected {
                code,
                rejection,
                epoch,
            } => {
                if epoch != state.epoch {
                    tracing::debug!(code = %code, "stale promo rejection dropped");
                    return SmallVec::new();
                }
                state.promo_request_in_flight = false;
                state.last_rejection = Some(rejection);
                SmallVec::new()
            },

            CartAction::RemovePromoCode => {
                state.cart.applied_promo_code = None;
                SmallVec::new()
            },

            // ========== Gift card ==========
            CartAction::ApplyGiftCard { code } => {
                if state.gift_card_request_in_flight {
                    tracing::debug!("gift card validation already in flight");
                    return SmallVec::new();
                }
                state.gift_card_request_in_flight = true;
                state.last_rejection = None;

                let validator = Arc::clone(&env.gift_card_validator);
                let totals = state.totals();
                let amount_due = totals.subtotal.saturating_sub(totals.promo_discount);
                let epoch = state.epoch;

                smallvec![Effect::Future(Box::pin(async move {
                    match validator.validate(&code, amount_due).await {
                        Ok(grant) => Some(CartAction::GiftCardAccepted {
                            code: grant.code,
                            balance: grant.balance,
                            epoch,
                        }),
                        Err(error) => {
                            tracing::warn!(code = %code, %error, "gift card refused");
                            Some(CartAction::GiftCardRejected {
                                code,
                                rejection: error.into(),
                                epoch,
                            })
                        },
                    }
                }))]
            },

            CartAction::GiftCardAccepted {
                code,
                balance,
                epoch,
            } => {
                if epoch != state.epoch {
                    tracing::debug!(code = %code, "stale gift card completion dropped");
                    return SmallVec::new();
                }
                state.gift_card_request_in_flight = false;
                state.last_rejection = None;

                // Recomputed against the cart as it is now, not as it was
                // when the request went out: lines may have changed during
                // the round-trip.
                let totals = state.totals();
                let amount_due = totals.subtotal.saturating_sub(totals.promo_discount);
                state.cart.applied_gift_card = Some(AppliedGiftCard {
                    code,
                    balance,
                    amount_applied: balance.min(amount_due),
                });
                SmallVec::new()
            },

            CartAction::GiftCardRejected {
                code,
                rejection,
                epoch,
            } => {
                if epoch != state.epoch {
                    tracing::debug!(code = %code, "stale gift card rejection dropped");
                    return SmallVec::new();
                }
                state.gift_card_request_in_flight = false;
                state.last_rejection = Some(rejection);
                SmallVec::new()
            },

            CartAction::RemoveGiftCard => {
                state.cart.applied_gift_card = None;
                SmallVec::new()
            },

            // ========== Reset ==========
            CartAction::Reset => {
                state.cart = Cart::new();
                state.promo_request_in_flight = false;
                state.gift_card_request_in_flight = false;
                state.last_rejection = None;
                state.epoch += 1;
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{RejectionReason, TicketTypeId};
    use crate::validator::{DemoGiftCardValidator, DemoPromoValidator};
    use bookflow_testing::{ReducerTest, assertions};

    fn test_env() -> CartEnvironment {
        CartEnvironment::new(DemoPromoValidator::shared(), DemoGiftCardValidator::shared())
    }

    fn adult_ticket() -> TicketType {
        TicketType::new(TicketTypeId::new(), "Adult".to_string(), Money::from_dollars(30))
    }

    fn cart_with_two_adults() -> CartState {
        let mut state = CartState::new();
        state.cart.add_lines(&adult_ticket(), 2, None);
        state
    }

    #[test]
    fn add_tickets_appends_lines_at_unit_price() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(CartState::new())
            .when_action(CartAction::AddTickets {
                ticket_type: adult_ticket(),
                quantity: 2,
                per_line_promo_code: None,
            })
            .then_state(|state| {
                assert_eq!(state.cart.line_count(), 2);
                assert_eq!(state.totals().subtotal, Money::from_dollars(60));
                assert_eq!(state.totals().total, Money::from_dollars(60));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn add_tickets_with_zero_quantity_is_noop() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(CartState::new())
            .when_action(CartAction::AddTickets {
                ticket_type: adult_ticket(),
                quantity: 0,
                per_line_promo_code: None,
            })
            .then_state(|state| {
                assert!(state.cart.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn remove_absent_line_is_noop() {
        let state = cart_with_two_adults();
        let before = state.cart.clone();

        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CartAction::RemoveLine {
                line_id: LineId::new(),
            })
            .then_state(move |state| {
                assert_eq!(state.cart, before);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn apply_promo_dispatches_validator_effect() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(cart_with_two_adults())
            .when_action(CartAction::ApplyPromoCode {
                code: "FIRST".to_string(),
            })
            .then_state(|state| {
                assert!(state.promo_request_in_flight);
                assert!(state.cart.applied_promo_code.is_none());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn apply_promo_while_in_flight_is_noop() {
        let mut state = cart_with_two_adults();
        state.promo_request_in_flight = true;

        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CartAction::ApplyPromoCode {
                code: "SAVE20".to_string(),
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn fixed_promo_discounts_five_dollars() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(cart_with_two_adults())
            .when_action(CartAction::PromoCodeAccepted {
                code: "FIRST".to_string(),
                kind: PromoKind::Fixed {
                    amount: Money::from_dollars(5),
                },
                epoch: 0,
            })
            .then_state(|state| {
                let totals = state.totals();
                assert_eq!(totals.promo_discount, Money::from_dollars(5));
                assert_eq!(totals.total, Money::from_dollars(55));
            })
            .run();
    }

    #[test]
    fn percentage_promo_discounts_twenty_percent() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(cart_with_two_adults())
            .when_action(CartAction::PromoCodeAccepted {
                code: "SAVE20".to_string(),
                kind: PromoKind::Percentage { percentage: 20 },
                epoch: 0,
            })
            .then_state(|state| {
                let totals = state.totals();
                assert_eq!(totals.promo_discount, Money::from_dollars(12));
                assert_eq!(totals.total, Money::from_dollars(48));
            })
            .run();
    }

    #[test]
    fn second_promo_silently_replaces_first() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(cart_with_two_adults())
            .when_action(CartAction::PromoCodeAccepted {
                code: "FIRST".to_string(),
                kind: PromoKind::Fixed {
                    amount: Money::from_dollars(5),
                },
                epoch: 0,
            })
            .when_action(CartAction::PromoCodeAccepted {
                code: "SAVE20".to_string(),
                kind: PromoKind::Percentage { percentage: 20 },
                epoch: 0,
            })
            .then_state(|state| {
                let promo = state.cart.applied_promo_code.as_ref().unwrap();
                assert_eq!(promo.code, "SAVE20");
                assert_eq!(state.totals().promo_discount, Money::from_dollars(12));
            })
            .run();
    }

    #[test]
    fn rejection_leaves_totals_unchanged() {
        let mut state = cart_with_two_adults();
        state.promo_request_in_flight = true;
        let before = state.totals();

        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CartAction::PromoCodeRejected {
                code: "BOGUS".to_string(),
                rejection: DiscountRejection::Rejected(RejectionReason::InvalidCode),
                epoch: 0,
            })
            .then_state(move |state| {
                assert_eq!(state.totals(), before);
                assert_eq!(state.totals().subtotal, Money::from_dollars(60));
                assert!(!state.promo_request_in_flight);
                assert_eq!(
                    state.last_rejection,
                    Some(DiscountRejection::Rejected(RejectionReason::InvalidCode))
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stale_promo_completion_is_dropped() {
        let mut state = cart_with_two_adults();
        state.epoch = 3;

        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CartAction::PromoCodeAccepted {
                code: "FIRST".to_string(),
                kind: PromoKind::Fixed {
                    amount: Money::from_dollars(5),
                },
                epoch: 2,
            })
            .then_state(|state| {
                assert!(state.cart.applied_promo_code.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn gift_card_applies_after_promo() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(cart_with_two_adults())
            .when_action(CartAction::PromoCodeAccepted {
                code: "SAVE20".to_string(),
                kind: PromoKind::Percentage { percentage: 20 },
                epoch: 0,
            })
            .when_action(CartAction::GiftCardAccepted {
                code: "GIFT100".to_string(),
                balance: Money::from_dollars(100),
                epoch: 0,
            })
            .then_state(|state| {
                let card = state.cart.applied_gift_card.as_ref().unwrap();
                // Covers the remainder after the promo, not the raw subtotal
                assert_eq!(card.amount_applied, Money::from_dollars(48));

                let totals = state.totals();
                assert_eq!(totals.gift_card_discount, Money::from_dollars(48));
                assert_eq!(totals.total, Money::ZERO);
            })
            .run();
    }

    #[test]
    fn remove_discounts_always_succeeds() {
        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(cart_with_two_adults())
            .when_action(CartAction::RemovePromoCode)
            .when_action(CartAction::RemoveGiftCard)
            .then_state(|state| {
                assert!(state.cart.applied_promo_code.is_none());
                assert!(state.cart.applied_gift_card.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn reset_clears_lines_discounts_and_bumps_epoch() {
        let mut state = cart_with_two_adults();
        state.cart.applied_promo_code = Some(AppliedPromoCode {
            code: "FIRST".to_string(),
            kind: PromoKind::Fixed {
                amount: Money::from_dollars(5),
            },
        });
        state.cart.applied_gift_card = Some(AppliedGiftCard {
            code: "GIFT25".to_string(),
            balance: Money::from_dollars(25),
            amount_applied: Money::from_dollars(25),
        });
        state.promo_request_in_flight = true;

        ReducerTest::new(CartReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(CartAction::Reset)
            .then_state(|state| {
                assert!(state.cart.is_empty());
                assert!(state.cart.applied_promo_code.is_none());
                assert!(state.cart.applied_gift_card.is_none());
                assert!(!state.promo_request_in_flight);
                assert_eq!(state.epoch, 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
