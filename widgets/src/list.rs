//! List booking widget.
//!
//! Experience-list skin: the customer browses the catalog, picks an
//! experience, then a date and slot. Per-type quantities clamp to 0–10,
//! matching the calendar skin.

use crate::session::{BookingSession, QuantityPolicy};
use bookflow_engine::{
    CatalogError, CatalogSource, Experience, FlowEnvironment, TicketType,
};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

/// List presentation over the shared booking session
pub struct ListWidget {
    session: BookingSession,
    catalog: Arc<dyn CatalogSource>,
}

impl ListWidget {
    /// Creates a list widget over a catalog
    #[must_use]
    pub fn new(env: FlowEnvironment, catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            session: BookingSession::new(env, QuantityPolicy::CLAMPED),
            catalog,
        }
    }

    /// The experiences to list
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog cannot be reached.
    pub async fn experiences(&self) -> Result<Vec<Experience>, CatalogError> {
        self.catalog.experiences().await
    }

    /// Picks an experience from the list and loads slots for a date
    pub async fn choose(&self, experience: Experience, date: NaiveDate) {
        self.session.select_experience(experience, date).await;
    }

    /// Picks a time slot
    pub async fn pick_slot(&self, time: NaiveTime) {
        self.session.select_time(time).await;
    }

    /// Sets a ticket type's quantity (clamped to 0–10)
    pub async fn set_quantity(&self, ticket_type: &TicketType, quantity: u32) {
        self.session.set_quantity(ticket_type, quantity).await;
    }

    /// The underlying session, for the shared checkout steps
    #[must_use]
    pub const fn session(&self) -> &BookingSession {
        &self.session
    }
}
