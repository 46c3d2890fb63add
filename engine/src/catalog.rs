//! Catalog source contract.
//!
//! Supplies the list of bookable experiences with their ticket types.
//! Consumed read-only: the booking flow never writes back to the catalog.

use crate::money::Money;
use crate::types::{Experience, ExperienceId, TicketType, TicketTypeId};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Boxed future returned by [`CatalogSource::experiences`]
pub type CatalogFuture = Pin<Box<dyn Future<Output = Result<Vec<Experience>, CatalogError>> + Send>>;

/// Catalog lookup failure
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The source could not be reached or answered garbage
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Catalog source collaborator
pub trait CatalogSource: Send + Sync {
    /// The organization's bookable experiences
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] on transport failure.
    fn experiences(&self) -> CatalogFuture;
}

// ============================================================================
// Hosted implementation
// ============================================================================

#[derive(Deserialize)]
struct TicketTypeRow {
    id: Uuid,
    name: String,
    price: u64,
}

#[derive(Deserialize)]
struct ExperienceRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    capacity: u32,
    duration_minutes: u32,
    media_url: Option<String>,
    ticket_types: Vec<TicketTypeRow>,
}

/// Catalog source backed by the hosted backend
#[derive(Clone)]
pub struct HostedCatalogSource {
    client: reqwest::Client,
    base_url: String,
}

impl HostedCatalogSource {
    /// Creates a hosted catalog source
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(client: reqwest::Client, base_url: String) -> Arc<dyn CatalogSource> {
        Arc::new(Self::new(client, base_url))
    }
}

impl CatalogSource for HostedCatalogSource {
    fn experiences(&self) -> CatalogFuture {
        let client = self.client.clone();
        let url = format!("{}/rest/v1/experiences", self.base_url);

        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

            let rows: Vec<ExperienceRow> = response
                .json()
                .await
                .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

            Ok(rows
                .into_iter()
                .map(|row| Experience {
                    id: ExperienceId::from_uuid(row.id),
                    name: row.name,
                    description: row.description,
                    capacity: row.capacity,
                    duration_minutes: row.duration_minutes,
                    media_url: row.media_url,
                    ticket_types: row
                        .ticket_types
                        .into_iter()
                        .map(|t| TicketType {
                            id: TicketTypeId::from_uuid(t.id),
                            name: t.name,
                            price: Money::from_cents(t.price),
                        })
                        .collect(),
                })
                .collect())
        })
    }
}

// ============================================================================
// Demo implementation
// ============================================================================

/// Fixed catalog for local use without a backend
#[derive(Clone, Debug)]
pub struct DemoCatalogSource {
    experiences: Vec<Experience>,
}

impl DemoCatalogSource {
    /// Creates the demo catalog with two escape rooms
    #[must_use]
    pub fn new() -> Self {
        let vault = Experience {
            id: ExperienceId::new(),
            name: "The Vault".to_string(),
            description: Some("Crack the safe before the guards return.".to_string()),
            capacity: 8,
            duration_minutes: 60,
            media_url: None,
            ticket_types: vec![
                TicketType::new(TicketTypeId::new(), "Adult".to_string(), Money::from_dollars(30)),
                TicketType::new(TicketTypeId::new(), "Child".to_string(), Money::from_dollars(20)),
                TicketType::new(
                    TicketTypeId::new(),
                    "Veteran".to_string(),
                    Money::from_dollars(25),
                ),
            ],
        };
        let express = Experience {
            id: ExperienceId::new(),
            name: "Midnight Express".to_string(),
            description: Some("Escape the train before it reaches the border.".to_string()),
            capacity: 6,
            duration_minutes: 75,
            media_url: None,
            ticket_types: vec![TicketType::new(
                TicketTypeId::new(),
                "Standard".to_string(),
                Money::from_dollars(35),
            )],
        };
        Self {
            experiences: vec![vault, express],
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn CatalogSource> {
        Arc::new(Self::new())
    }
}

impl Default for DemoCatalogSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSource for DemoCatalogSource {
    fn experiences(&self) -> CatalogFuture {
        let experiences = self.experiences.clone();
        Box::pin(async move { Ok(experiences) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_catalog_lists_experiences() {
        let catalog = DemoCatalogSource::new();
        let experiences = catalog.experiences().await.unwrap();

        assert_eq!(experiences.len(), 2);
        let vault = &experiences[0];
        assert_eq!(vault.ticket_types.len(), 3);
        assert_eq!(vault.price_from(), Some(Money::from_dollars(20)));
    }
}
