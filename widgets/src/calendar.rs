//! Calendar booking widget.
//!
//! Date-first skin: the customer opens an experience on a calendar date,
//! browses the slot grid, and books with per-type quantities clamped to
//! 0–10.

use crate::session::{BookingSession, QuantityPolicy};
use bookflow_engine::{Experience, FlowEnvironment, TicketType, TimeSlot};
use chrono::{NaiveDate, NaiveTime};

/// Calendar presentation over the shared booking session
pub struct CalendarWidget {
    session: BookingSession,
}

impl CalendarWidget {
    /// Creates a calendar widget
    #[must_use]
    pub fn new(env: FlowEnvironment) -> Self {
        Self {
            session: BookingSession::new(env, QuantityPolicy::CLAMPED),
        }
    }

    /// Opens an experience on a date and loads its slot grid
    pub async fn open(&self, experience: Experience, date: NaiveDate) {
        self.session.select_experience(experience, date).await;
    }

    /// Moves the calendar to another date
    pub async fn change_date(&self, date: NaiveDate) {
        self.session.select_date(date).await;
    }

    /// The loaded slot grid for the selected date
    pub async fn slot_grid(&self) -> Vec<TimeSlot> {
        self.session.slots().await
    }

    /// Picks a slot from the grid
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
