//! Property tests for the pricing arithmetic.
//!
//! Checks the discount invariants over arbitrary carts: the total never goes
//! negative, the gift card always computes against the post-promo remainder,
//! and reads are stable.

#![allow(clippy::unwrap_used)]

use bookflow_engine::{
    AppliedGiftCard, AppliedPromoCode, Cart, CartLine, LineId, Money, PromoKind, TicketTypeId,
};
use proptest::prelude::*;

fn arb_lines() -> impl Strategy<Value = Vec<CartLine>> {
    prop::collection::vec(1u64..=50_000, 0..12).prop_map(|prices| {
        prices
            .into_iter()
            .map(|cents| CartLine {
                line_id: LineId::new(),
                ticket_type_id: TicketTypeId::new(),
                ticket_type_name: "Ticket".to_string(),
                unit_price: Money::from_cents(cents),
                per_line_promo_code: None,
            })
            .collect()
    })
}

fn arb_promo() -> impl Strategy<Value = Option<AppliedPromoCode>> {
    prop::option::of(
        prop_oneof![
            (0u64..=20_000).prop_map(|cents| PromoKind::Fixed {
                amount: Money::from_cents(cents)
            }),
            (0u32..=150).prop_map(|percentage| PromoKind::Percentage { percentage }),
        ]
        .prop_map(|kind| AppliedPromoCode {
            code: "PROMO".to_string(),
            kind,
        }),
    )
}

fn arb_gift_card() -> impl Strategy<Value = Option<AppliedGiftCard>> {
    prop::option::of((0u64..=100_000).prop_map(|cents| AppliedGiftCard {
        code: "GIFT".to_string(),
        balance: Money::from_cents(cents),
        amount_applied: Money::ZERO,
    }))
}

fn arb_cart() -> impl Strategy<Value = Cart> {
    (arb_lines(), arb_promo(), arb_gift_card()).prop_map(|(lines, promo, gift)| Cart {
        lines,
        applied_promo_code: promo,
        applied_gift_card: gift,
    })
}

proptest! {
    /// Discounts never push the total below zero, and nothing is lost:
    /// the discounts and the total always partition the subtotal.
    #[test]
    fn total_partitions_subtotal(cart in arb_cart()) {
        let totals = cart.totals();
        let recombined = totals
            .total
            .saturating_add(totals.promo_discount)
            .saturating_add(totals.gift_card_discount);
        prop_assert_eq!(recombined, totals.subtotal);
    }

    /// The promo discount never exceeds the subtotal.
    #[test]
    fn promo_discount_capped_at_subtotal(cart in arb_cart()) {
        let totals = cart.totals();
        prop_assert!(totals.promo_discount <= totals.subtotal);
    }

    /// The gift card computes against the post-promo remainder, not the raw
    /// subtotal.
    #[test]
    fn gift_card_covers_post_promo_remainder(cart in arb_cart()) {
        let totals = cart.totals();
        let remainder = totals.subtotal.saturating_sub(totals.promo_discount);
        let expected = cart
            .applied_gift_card
            .as_ref()
            .map_or(Money::ZERO, |card| card.balance.min(remainder));
        prop_assert_eq!(totals.gift_card_discount, expected);
    }

    /// Reading totals twice without a mutation in between yields identical
    /// results.
    #[test]
    fn totals_read_is_idempotent(cart in arb_cart()) {
        prop_assert_eq!(cart.totals(), cart.totals());
    }
}
