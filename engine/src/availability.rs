//! Availability source contract.
//!
//! The contract: given `(experience, date)`, return the day's slots as an
//! ordered `{time, is_available}` list. Sold-out slots stay in the list,
//! flagged unavailable, so presentations can render them disabled.

use crate::types::{ExperienceId, TimeSlot};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Boxed future returned by [`AvailabilitySource::slots`]
pub type AvailabilityFuture = Pin<Box<dyn Future<Output = Result<Vec<TimeSlot>, AvailabilityError>> + Send>>;

/// Availability lookup failure
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    /// The source could not be reached or answered garbage
    #[error("Availability unavailable: {0}")]
    Unavailable(String),
}

/// Availability source collaborator
pub trait AvailabilitySource: Send + Sync {
    /// Slots for one experience on one date, ordered ascending by time
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::Unavailable`] on transport failure.
    fn slots(&self, experience_id: ExperienceId, date: NaiveDate) -> AvailabilityFuture;
}

// ============================================================================
// Hosted implementation
// ============================================================================

#[derive(Deserialize)]
struct SlotRow {
    time: NaiveTime,
    is_available: bool,
}

/// Availability source backed by the hosted backend
#[derive(Clone)]
pub struct HostedAvailabilitySource {
    client: reqwest::Client,
    base_url: String,
}

impl HostedAvailabilitySource {
    /// Creates a hosted availability source
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(client: reqwest::Client, base_url: String) -> Arc<dyn AvailabilitySource> {
        Arc::new(Self::new(client, base_url))
    }
}

impl AvailabilitySource for HostedAvailabilitySource {
    fn slots(&self, experience_id: ExperienceId, date: NaiveDate) -> AvailabilityFuture {
        let client = self.client.clone();
        let url = format!("{}/rest/v1/availability", self.base_url);

        Box::pin(async move {
            let response = client
                .get(&url)
                .query(&[
                    ("experience_id", experience_id.to_string()),
                    ("date", date.to_string()),
                ])
                .send()
                .await
                .map_err(|e| AvailabilityError::Unavailable(e.to_string()))?;

            let rows: Vec<SlotRow> = response
                .json()
                .await
                .map_err(|e| AvailabilityError::Unavailable(e.to_string()))?;

            let mut slots: Vec<TimeSlot> = rows
                .into_iter()
                .map(|row| TimeSlot {
                    time: row.time,
                    is_available: row.is_available,
                })
                .collect();
            // The contract promises ascending order regardless of how the
            // backend returns rows.
            slots.sort_by_key(|slot| slot.time);
            Ok(slots)
        })
    }
}

// ============================================================================
// Demo implementation
// ============================================================================

/// Deterministic availability for local use without a backend
///
/// Generates hourly slots between opening and closing hour, with a
/// configurable set of sold-out times. No randomness: the same inputs
/// always produce the same grid.
#[derive(Clone, Debug)]
pub struct DemoAvailabilitySource {
    opening_hour: u32,
    closing_hour: u32,
    sold_out: Vec<NaiveTime>,
}

impl DemoAvailabilitySource {
    /// Creates a demo source with 10:00–18:00 hourly slots, none sold out
    #[must_use]
    pub const fn new() -> Self {
        Self {
            opening_hour: 10,
            closing_hour: 18,
            sold_out: Vec::new(),
        }
    }

    /// Marks specific times as sold out
    #[must_use]
    pub fn with_sold_out(mut self, times: Vec<NaiveTime>) -> Self {
        self.sold_out = times;
        self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn AvailabilitySource> {
        Arc::new(Self::new())
    }
}

impl Default for DemoAvailabilitySource {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilitySource for DemoAvailabilitySource {
    fn slots(&self, _experience_id: ExperienceId, _date: NaiveDate) -> AvailabilityFuture {
        let hours = self.opening_hour..=self.closing_hour;
        let sold_out = self.sold_out.clone();

        Box::pin(async move {
            let slots = hours
                .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
                .map(|time| TimeSlot {
                    time,
                    is_available: !sold_out.contains(&time),
                })
                .collect();
            Ok(slots)
        })
    }
}
