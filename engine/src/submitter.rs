//! Checkout submitter contract.
//!
//! The external service that finalizes payment and creates the reservation
//! record. The hosted submitter calls the booking endpoint; the demo
//! submitter always succeeds, for local use without a backend. Scripted
//! failure and hang behavior for tests lives in `crate::mocks`.

use crate::types::{BookingConfirmation, BookingDraft, BookingReference, CheckoutFailure};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Boxed future returned by [`CheckoutSubmitter::submit`]
pub type SubmitFuture = Pin<Box<dyn Future<Output = Result<BookingConfirmation, CheckoutFailure>> + Send>>;

/// Checkout submitter collaborator
pub trait CheckoutSubmitter: Send + Sync {
    /// Attempt to create the booking and charge the customer
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutFailure`] describing the decline or backend
    /// error. Transport failures map to [`CheckoutFailure::Backend`]; the
    /// caller is responsible for bounding the call with a timeout and
    /// treating elapse as [`CheckoutFailure::OutcomeUnknown`].
    fn submit(&self, draft: &BookingDraft) -> SubmitFuture;
}

// ============================================================================
// Hosted implementation
// ============================================================================

#[derive(Deserialize)]
struct SubmitResponse {
    success: bool,
    booking_reference: Option<String>,
    reason: Option<String>,
}

/// Checkout submitter backed by the hosted backend
#[derive(Clone)]
pub struct HostedCheckoutSubmitter {
    client: reqwest::Client,
    base_url: String,
}

impl HostedCheckoutSubmitter {
    /// Creates a hosted checkout submitter
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(client: reqwest::Client, base_url: String) -> Arc<dyn CheckoutSubmitter> {
        Arc::new(Self::new(client, base_url))
    }
}

impl CheckoutSubmitter for HostedCheckoutSubmitter {
    fn submit(&self, draft: &BookingDraft) -> SubmitFuture {
        let client = self.client.clone();
        let url = format!("{}/functions/v1/create-booking", self.base_url);
        let draft = draft.clone();

        Box::pin(async move {
            let response = client
                .post(&url)
                .json(&draft)
                .send()
                .await
                .map_err(|e| CheckoutFailure::Backend {
                    message: e.to_string(),
                })?;

            let body: SubmitResponse =
                response.json().await.map_err(|e| CheckoutFailure::Backend {
                    message: e.to_string(),
                })?;

            if body.success {
                let Some(reference) = body.booking_reference else {
                    return Err(CheckoutFailure::Backend {
                        message: "confirmation carried no booking reference".to_string(),
                    });
                };
                tracing::info!(reference = %reference, "booking confirmed");
                Ok(BookingConfirmation {
                    booking_reference: BookingReference::new(reference),
                })
            } else {
                Err(CheckoutFailure::Declined {
                    reason: body.reason.unwrap_or_else(|| "Payment declined".to_string()),
                })
            }
        })
    }
}

// ============================================================================
// Demo implementation
// ============================================================================

/// Checkout submitter that always succeeds, for local use without a backend
#[derive(Clone, Debug, Default)]
pub struct DemoCheckoutSubmitter;

impl DemoCheckoutSubmitter {
    /// Creates a new demo submitter
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

impl CheckoutSubmitter for DemoCheckoutSubmitter {
    fn submit(&self, draft: &BookingDraft) -> SubmitFuture {
        let experience = draft.experience_name.clone();
        let total = draft.cart.totals().total;

        Box::pin(async move {
            let reference = format!("BK-{}", Uuid::new_v4().simple());

            tracing::info!(
                experience = %experience,
                total = %total,
                reference = %reference,
                "demo booking confirmed"
            );

            Ok(BookingConfirmation {
                booking_reference: BookingReference::new(reference),
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Cart, ContactDetails, ExperienceId, PaymentDetails, TicketType, TicketTypeId};
    use chrono::{NaiveDate, NaiveTime};

    fn draft() -> BookingDraft {
        let mut cart = Cart::new();
        cart.add_lines(
            &TicketType::new(TicketTypeId::new(), "Adult".to_string(), Money::from_dollars(30)),
            2,
            None,
        );
        BookingDraft {
            experience_id: ExperienceId::new(),
            experience_name: "The Vault".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            cart,
            contact: ContactDetails::default(),
            payment: PaymentDetails::default(),
        }
    }

    #[tokio::test]
    async fn demo_submitter_confirms_with_reference() {
        let submitter = DemoCheckoutSubmitter::new();

        let confirmation = submitter.submit(&draft()).await.unwrap();
        assert!(confirmation.booking_reference.as_str().starts_with("BK-"));
    }
}
