//! Quick-book widget.
//!
//! Single-experience skin optimized for one-tap booking: unbounded one-unit
//! adds, and a promo code can be applied per ticket type *before* lines are
//! created, baking the discounted price into each new line. Baked prices
//! are irreversible per line except by removing the line — changing or
//! removing the code later never mutates lines already in the cart.

use crate::session::{BookingSession, QuantityPolicy};
use bookflow_engine::{
    DiscountRejection, Experience, FlowEnvironment, Money, PromoCodeValidator, PromoKind,
    TicketType, TicketTypeId, ValidatorError,
};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A per-ticket-type promo grant, baked into future lines
#[derive(Clone, Debug)]
struct BakedPromo {
    code: String,
    discounted_price: Money,
}

/// Quick-book presentation over the shared booking session
pub struct QuickBookWidget {
    session: BookingSession,
    experience: Experience,
    promo_validator: Arc<dyn PromoCodeValidator>,
    baked: Mutex<HashMap<TicketTypeId, BakedPromo>>,
}

impl QuickBookWidget {
    /// Creates a quick-book widget pinned to one experience
    #[must_use]
    pub fn new(env: FlowEnvironment, experience: Experience) -> Self {
        let promo_validator = Arc::clone(&env.cart.promo_validator);
        Self {
            session: BookingSession::new(env, QuantityPolicy::UNBOUNDED),
            experience,
            promo_validator,
            baked: Mutex::new(HashMap::new()),
        }
    }

    /// The pinned experience
    #[must_use]
    pub const fn experience(&self) -> &Experience {
        &self.experience
    }

    /// Opens the booking on a date and loads slots
    pub async fn open(&self, date: NaiveDate) {
        self.session
            .select_experience(self.experience.clone(), date)
            .await;
    }

    /// Picks a time slot
    pub async fn pick_slot(&self, time: NaiveTime) {
        self.session.select_time(time).await;
    }

    /// Validates a promo code against one ticket type's price and bakes the
    /// discounted price into subsequent adds of that type
    ///
    /// Lines already in the cart keep the price they were created with.
    ///
    /// # Errors
    ///
    /// Returns the [`DiscountRejection`] when the validator refuses the code.
    pub async fn apply_ticket_type_promo(
        &self,
        ticket_type_id: &TicketTypeId,
        code: &str,
    ) -> Result<Money, DiscountRejection> {
        let Some(ticket_type) = self.experience.ticket_type(ticket_type_id) else {
            return Err(DiscountRejection::Unavailable);
        };

        match self.promo_validator.validate(code, ticket_type.price).await {
            Ok(grant) => {
                let discounted_price = match grant.kind {
                    PromoKind::Fixed { amount } => ticket_type.price.saturating_sub(amount),
                    PromoKind::Percentage { percentage } => ticket_type
                        .price
                        .saturating_sub(ticket_type.price.percentage_of(percentage)),
                };
                tracing::debug!(
                    ticket_type = %ticket_type.name,
                    code = %grant.code,
                    %discounted_price,
                    "promo baked into ticket type"
                );
                self.lock_baked().insert(
                    *ticket_type_id,
                    BakedPromo {
                        code: grant.code,
                        discounted_price,
                    },
                );
                Ok(discounted_price)
            },
            Err(ValidatorError::Rejected(reason)) => Err(DiscountRejection::Rejected(reason)),
            Err(ValidatorError::Unavailable(_)) => Err(DiscountRejection::Unavailable),
        }
    }

    /// Adds one unit of a ticket type, at the baked price if a per-type
    /// promo is active
    pub async fn add_ticket(&self, ticket_type_id: &TicketTypeId) {
        let Some(ticket_type) = self.experience.ticket_type(ticket_type_id) else {
            tracing::warn!(%ticket_type_id, "unknown ticket type ignored");
            return;
        };

        let baked = self.lock_baked().get(ticket_type_id).cloned();
        let (price, code) = baked.map_or((ticket_type.price, None), |promo| {
            (promo.discounted_price, Some(promo.code))
        });

        self.session
            .add_unit(
                TicketType::new(ticket_type.id, ticket_type.name.clone(), price),
                code,
            )
            .await;
    }

    /// The underlying session, for the shared checkout steps
    #[must_use]
    pub const fn session(&self) -> &BookingSession {
        &self.session
    }

    fn lock_baked(&self) -> std::sync::MutexGuard<'_, HashMap<TicketTypeId, BakedPromo>> {
        self.baked.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookflow_engine::{
        CartEnvironment, DemoAvailabilitySource, DemoCheckoutSubmitter, DemoGiftCardValidator,
        DemoPromoValidator, ExperienceId,
    };
    use bookflow_testing::test_clock;

    fn experience() -> Experience {
        Experience {
            id: ExperienceId::new(),
            name: "The Vault".to_string(),
            description: None,
            capacity: 8,
            duration_minutes: 60,
            media_url: None,
            ticket_types: vec![
                TicketType::new(TicketTypeId::new(), "Adult".to_string(), Money::from_dollars(30)),
                TicketType::new(TicketTypeId::new(), "Child".to_string(), Money::from_dollars(20)),
            ],
        }
    }

    fn widget(experience: Experience) -> QuickBookWidget {
        QuickBookWidget::new(
            FlowEnvironment::new(
                Arc::new(test_clock()),
                DemoAvailabilitySource::shared(),
                DemoCheckoutSubmitter::shared(),
                CartEnvironment::new(
                    DemoPromoValidator::shared(),
                    DemoGiftCardValidator::shared(),
                ),
            ),
            experience,
        )
    }

    #[tokio::test]
    async fn adds_are_unbounded_single_units() {
        let experience = experience();
        let adult = experience.ticket_types[0].id;
        let widget = widget(experience);

        widget.open(NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()).await;
        for _ in 0..12 {
            widget.add_ticket(&adult).await;
        }

        assert_eq!(widget.session().quantity_of(&adult).await, 12);
    }

    #[tokio::test]
    async fn baked_promo_discounts_new_lines_only() {
        let experience = experience();
        let adult = experience.ticket_types[0].id;
        let widget = widget(experience);

        widget.open(NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()).await;

        // One line at full price
        widget.add_ticket(&adult).await;

        // SAVE20 bakes a 20% discount into subsequent adds: $30 → $24
        let discounted = widget.apply_ticket_type_promo(&adult, "SAVE20").await.unwrap();
        assert_eq!(discounted, Money::from_dollars(24));

        widget.add_ticket(&adult).await;

        // $30 (pre-promo line untouched) + $24 (baked line)
        let totals = widget.session().totals().await;
        assert_eq!(totals.subtotal, Money::from_dollars(54));
    }

    #[tokio::test]
    async fn rejected_type_promo_changes_nothing() {
        let experience = experience();
        let adult = experience.ticket_types[0].id;
        let widget = widget(experience);

        widget.open(NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()).await;

        let result = widget.apply_ticket_type_promo(&adult, "BOGUS").await;
        assert!(result.is_err());

        widget.add_ticket(&adult).await;
        let totals = widget.session().totals().await;
        assert_eq!(totals.subtotal, Money::from_dollars(30));
    }
}
