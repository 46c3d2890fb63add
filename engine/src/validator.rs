//! Discount validator contracts.
//!
//! Two independent validators with an identical shape: given a code and the
//! relevant subtotal, return either a grant or a rejection reason. The
//! hosted implementations call the backend's edge functions scoped to an
//! organization; the demo implementations use a fixed in-memory code table
//! and behave identically in shape, for local use without a backend.

use crate::money::Money;
use crate::types::{OrganizationId, PromoKind, RejectionReason};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Validator call result
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Boxed future returned by validator trait methods
pub type ValidatorFuture<T> = Pin<Box<dyn Future<Output = ValidatorResult<T>> + Send>>;

/// Why a validation call did not produce a grant
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    /// The validator understood the code and refused it
    #[error("{0}")]
    Rejected(RejectionReason),
    /// The validator could not be reached or answered garbage
    #[error("Discount validation unavailable: {0}")]
    Unavailable(String),
}

/// What the customer sees when a discount attempt fails
///
/// Domain rejections keep their taxonomy; transport problems collapse into
/// a generic message so backend details never leak into the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountRejection {
    /// The validator refused the code
    Rejected(RejectionReason),
    /// The validation round-trip failed; the code may still be valid
    Unavailable,
}

impl fmt::Display for DiscountRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(RejectionReason::InvalidCode) => write!(f, "That code is not valid"),
            Self::Rejected(RejectionReason::Expired) => write!(f, "That code has expired"),
            Self::Rejected(RejectionReason::NotYetActive) => {
                write!(f, "That code is not active yet")
            },
            Self::Rejected(RejectionReason::UsageLimitReached) => {
                write!(f, "That code has reached its usage limit")
            },
            Self::Rejected(RejectionReason::BelowMinimumOrder) => {
                write!(f, "Your order does not meet the minimum for that code")
            },
            Self::Rejected(RejectionReason::NoBalance) => {
                write!(f, "That gift card has no remaining balance")
            },
            Self::Unavailable => write!(f, "Something went wrong. Please try again."),
        }
    }
}

impl From<ValidatorError> for DiscountRejection {
    fn from(error: ValidatorError) -> Self {
        match error {
            ValidatorError::Rejected(reason) => Self::Rejected(reason),
            ValidatorError::Unavailable(_) => Self::Unavailable,
        }
    }
}

/// A promo code the validator accepted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoGrant {
    /// The code, normalized by the validator
    pub code: String,
    /// Fixed or percentage discount
    pub kind: PromoKind,
}

/// A gift card the validator accepted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCardGrant {
    /// The code, normalized by the validator
    pub code: String,
    /// Remaining stored value
    pub balance: Money,
}

/// Promo code validator collaborator
///
/// The subtotal is the raw cart subtotal — minimum-order rules evaluate
/// against what the customer is buying, before any discounts.
pub trait PromoCodeValidator: Send + Sync {
    /// Validate a promo code against the current subtotal
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Rejected`] for refused codes and
    /// [`ValidatorError::Unavailable`] for transport failures.
    fn validate(&self, code: &str, subtotal: Money) -> ValidatorFuture<PromoGrant>;
}

/// Gift card validator collaborator
///
/// The amount passed in is the remainder after the promo discount, since
/// gift cards cover what is left to pay.
pub trait GiftCardValidator: Send + Sync {
    /// Validate a gift card against the amount it would be applied to
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::Rejected`] for refused cards and
    /// [`ValidatorError::Unavailable`] for transport failures.
    fn validate(&self, code: &str, amount_due: Money) -> ValidatorFuture<GiftCardGrant>;
}

// ============================================================================
// Hosted implementations (backend edge functions)
// ============================================================================

#[derive(Serialize)]
struct ValidationRequest<'a> {
    organization_id: OrganizationId,
    code: &'a str,
    subtotal: u64,
}

#[derive(Deserialize)]
struct PromoValidationResponse {
    valid: bool,
    reason: Option<RejectionReason>,
    discount_amount: Option<u64>,
    discount_percentage: Option<u32>,
}

#[derive(Deserialize)]
struct GiftCardValidationResponse {
    valid: bool,
    reason: Option<RejectionReason>,
    balance: Option<u64>,
}

/// Promo code validator backed by the hosted backend
#[derive(Clone)]
pub struct HostedPromoValidator {
    client: reqwest::Client,
    base_url: String,
    organization_id: OrganizationId,
}

impl HostedPromoValidator {
    /// Creates a validator scoped to one organization
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        organization_id: OrganizationId,
    ) -> Self {
        Self {
            client,
            base_url,
            organization_id,
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(
        client: reqwest::Client,
        base_url: String,
        organization_id: OrganizationId,
    ) -> Arc<dyn PromoCodeValidator> {
        Arc::new(Self::new(client, base_url, organization_id))
    }
}

impl PromoCodeValidator for HostedPromoValidator {
    fn validate(&self, code: &str, subtotal: Money) -> ValidatorFuture<PromoGrant> {
        let client = self.client.clone();
        let url = format!("{}/functions/v1/validate-promo-code", self.base_url);
        let organization_id = self.organization_id;
        let code = code.to_owned();

        Box::pin(async move {
            let response = client
                .post(&url)
                .json(&ValidationRequest {
                    organization_id,
                    code: &code,
                    subtotal: subtotal.cents(),
                })
                .send()
                .await
                .map_err(|e| ValidatorError::Unavailable(e.to_string()))?;

            let body: PromoValidationResponse = response
                .json()
                .await
                .map_err(|e| ValidatorError::Unavailable(e.to_string()))?;

            if !body.valid {
                let reason = body.reason.unwrap_or(RejectionReason::InvalidCode);
                return Err(ValidatorError::Rejected(reason));
            }

            let kind = match (body.discount_amount, body.discount_percentage) {
                (Some(cents), _) => PromoKind::Fixed {
                    amount: Money::from_cents(cents),
                },
                (None, Some(percentage)) => PromoKind::Percentage { percentage },
                (None, None) => {
                    return Err(ValidatorError::Unavailable(
                        "valid response carried no discount".to_string(),
                    ));
                },
            };

            tracing::debug!(code = %code, "promo code accepted by backend");
            Ok(PromoGrant { code, kind })
        })
    }
}

/// Gift card validator backed by the hosted backend
#[derive(Clone)]
pub struct HostedGiftCardValidator {
    client: reqwest::Client,
    base_url: String,
    organization_id: OrganizationId,
}

impl HostedGiftCardValidator {
    /// Creates a validator scoped to one organization
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        organization_id: OrganizationId,
    ) -> Self {
        Self {
            client,
            base_url,
            organization_id,
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(
        client: reqwest::Client,
        base_url: String,
        organization_id: OrganizationId,
    ) -> Arc<dyn GiftCardValidator> {
        Arc::new(Self::new(client, base_url, organization_id))
    }
}

impl GiftCardValidator for HostedGiftCardValidator {
    fn validate(&self, code: &str, amount_due: Money) -> ValidatorFuture<GiftCardGrant> {
        let client = self.client.clone();
        let url = format!("{}/functions/v1/validate-gift-card", self.base_url);
        let organization_id = self.organization_id;
        let code = code.to_owned();

        Box::pin(async move {
            let response = client
                .post(&url)
                .json(&ValidationRequest {
                    organization_id,
                    code: &code,
                    subtotal: amount_due.cents(),
                })
                .send()
                .await
                .map_err(|e| ValidatorError::Unavailable(e.to_string()))?;

            let body: GiftCardValidationResponse = response
                .json()
                .await
                .map_err(|e| ValidatorError::Unavailable(e.to_string()))?;

            if !body.valid {
                let reason = body.reason.unwrap_or(RejectionReason::InvalidCode);
                return Err(ValidatorError::Rejected(reason));
            }

            let Some(balance) = body.balance else {
                return Err(ValidatorError::Unavailable(
                    "valid response carried no balance".to_string(),
                ));
            };

            tracing::debug!(code = %code, "gift card accepted by backend");
            Ok(GiftCardGrant {
                code,
                balance: Money::from_cents(balance),
            })
        })
    }
}

// ============================================================================
// Demo implementations (fixed in-memory tables, no backend required)
// ============================================================================

/// Where a demo code sits in its validity window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CodeWindow {
    Active,
    Expired,
    NotYetActive,
}

#[derive(Clone, Debug)]
struct DemoPromoCode {
    kind: PromoKind,
    window: CodeWindow,
    usage_limit_reached: bool,
    minimum_order: Option<Money>,
}

/// Promo code validator over a fixed demo table
///
/// Codes: `FIRST` ($5 off), `SAVE20` (20% off), `BIGSPENDER` (20% off
/// orders of $100+), plus `EXPIRED`, `EARLYBIRD`, and `POPULAR` exercising
/// each rejection reason. Lookup is case-insensitive.
#[derive(Clone, Debug)]
pub struct DemoPromoValidator {
    codes: HashMap<String, DemoPromoCode>,
}

impl DemoPromoValidator {
    /// Creates the demo validator with its built-in code table
    #[must_use]
    pub fn new() -> Self {
        let mut codes = HashMap::new();
        codes.insert(
            "FIRST".to_string(),
            DemoPromoCode {
                kind: PromoKind::Fixed {
                    amount: Money::from_dollars(5),
                },
                window: CodeWindow::Active,
                usage_limit_reached: false,
                minimum_order: None,
            },
        );
        codes.insert(
            "SAVE20".to_string(),
            DemoPromoCode {
                kind: PromoKind::Percentage { percentage: 20 },
                window: CodeWindow::Active,
                usage_limit_reached: false,
                minimum_order: None,
            },
        );
        codes.insert(
            "BIGSPENDER".to_string(),
            DemoPromoCode {
                kind: PromoKind::Percentage { percentage: 20 },
                window: CodeWindow::Active,
                usage_limit_reached: false,
                minimum_order: Some(Money::from_dollars(100)),
            },
        );
        codes.insert(
            "EXPIRED".to_string(),
            DemoPromoCode {
                kind: PromoKind::Fixed {
                    amount: Money::from_dollars(10),
                },
                window: CodeWindow::Expired,
                usage_limit_reached: false,
                minimum_order: None,
            },
        );
        codes.insert(
            "EARLYBIRD".to_string(),
            DemoPromoCode {
                kind: PromoKind::Percentage { percentage: 15 },
                window: CodeWindow::NotYetActive,
                usage_limit_reached: false,
                minimum_order: None,
            },
        );
        codes.insert(
            "POPULAR".to_string(),
            DemoPromoCode {
                kind: PromoKind::Fixed {
                    amount: Money::from_dollars(5),
                },
                window: CodeWindow::Active,
                usage_limit_reached: true,
                minimum_order: None,
            },
        );
        Self { codes }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn PromoCodeValidator> {
        Arc::new(Self::new())
    }
}

impl Default for DemoPromoValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PromoCodeValidator for DemoPromoValidator {
    fn validate(&self, code: &str, subtotal: Money) -> ValidatorFuture<PromoGrant> {
        let normalized = code.trim().to_uppercase();
        let entry = self.codes.get(&normalized).cloned();

        Box::pin(async move {
            let Some(entry) = entry else {
                return Err(ValidatorError::Rejected(RejectionReason::InvalidCode));
            };
            match entry.window {
                CodeWindow::Expired => {
                    return Err(ValidatorError::Rejected(RejectionReason::Expired));
                },
                CodeWindow::NotYetActive => {
                    return Err(ValidatorError::Rejected(RejectionReason::NotYetActive));
                },
                CodeWindow::Active => {},
            }
            if entry.usage_limit_reached {
                return Err(ValidatorError::Rejected(RejectionReason::UsageLimitReached));
            }
            if let Some(minimum) = entry.minimum_order {
                if subtotal < minimum {
                    return Err(ValidatorError::Rejected(RejectionReason::BelowMinimumOrder));
                }
            }
            Ok(PromoGrant {
                code: normalized,
                kind: entry.kind,
            })
        })
    }
}

#[derive(Clone, Debug)]
struct DemoGiftCard {
    balance: Money,
    window: CodeWindow,
}

/// Gift card validator over a fixed demo table
///
/// Cards: `GIFT100` ($100 balance), `GIFT25` ($25 balance), plus `DRAINED`
/// (zero balance) and `OLDGIFT` (expired). Lookup is case-insensitive.
#[derive(Clone, Debug)]
pub struct DemoGiftCardValidator {
    cards: HashMap<String, DemoGiftCard>,
}

impl DemoGiftCardValidator {
    /// Creates the demo validator with its built-in card table
    #[must_use]
    pub fn new() -> Self {
        let mut cards = HashMap::new();
        cards.insert(
            "GIFT100".to_string(),
            DemoGiftCard {
                balance: Money::from_dollars(100),
                window: CodeWindow::Active,
            },
        );
        cards.insert(
            "GIFT25".to_string(),
            DemoGiftCard {
                balance: Money::from_dollars(25),
                window: CodeWindow::Active,
            },
        );
        cards.insert(
            "DRAINED".to_string(),
            DemoGiftCard {
                balance: Money::ZERO,
                window: CodeWindow::Active,
            },
        );
        cards.insert(
            "OLDGIFT".to_string(),
            DemoGiftCard {
                balance: Money::from_dollars(50),
                window: CodeWindow::Expired,
            },
        );
        Self { cards }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn GiftCardValidator> {
        Arc::new(Self::new())
    }
}

impl Default for DemoGiftCardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl GiftCardValidator for DemoGiftCardValidator {
    fn validate(&self, code: &str, _amount_due: Money) -> ValidatorFuture<GiftCardGrant> {
        let normalized = code.trim().to_uppercase();
        let entry = self.cards.get(&normalized).cloned();

        Box::pin(async move {
            let Some(entry) = entry else {
                return Err(ValidatorError::Rejected(RejectionReason::InvalidCode));
            };
            match entry.window {
                CodeWindow::Expired => {
                    return Err(ValidatorError::Rejected(RejectionReason::Expired));
                },
                CodeWindow::NotYetActive => {
                    return Err(ValidatorError::Rejected(RejectionReason::NotYetActive));
                },
                CodeWindow::Active => {},
            }
            if entry.balance.is_zero() {
                return Err(ValidatorError::Rejected(RejectionReason::NoBalance));
            }
            Ok(GiftCardGrant {
                code: normalized,
                balance: entry.balance,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_promo_accepts_known_codes() {
        let validator = DemoPromoValidator::new();

        let grant = validator
            .validate("first", Money::from_dollars(60))
            .await
            .unwrap();
        assert_eq!(grant.code, "FIRST");
        assert_eq!(
            grant.kind,
            PromoKind::Fixed {
                amount: Money::from_dollars(5)
            }
        );
    }

    #[tokio::test]
    async fn demo_promo_rejects_unknown_code() {
        let validator = DemoPromoValidator::new();

        let result = validator.validate("BOGUS", Money::from_dollars(60)).await;
        assert_eq!(
            result,
            Err(ValidatorError::Rejected(RejectionReason::InvalidCode))
        );
    }

    #[tokio::test]
    async fn demo_promo_enforces_minimum_order() {
        let validator = DemoPromoValidator::new();

        let below = validator
            .validate("BIGSPENDER", Money::from_dollars(60))
            .await;
        assert_eq!(
            below,
            Err(ValidatorError::Rejected(RejectionReason::BelowMinimumOrder))
        );

        let above = validator
            .validate("BIGSPENDER", Money::from_dollars(120))
            .await;
        assert!(above.is_ok());
    }

    #[tokio::test]
    async fn demo_promo_rejects_each_window_state() {
        let validator = DemoPromoValidator::new();

        assert_eq!(
            validator.validate("EXPIRED", Money::from_dollars(60)).await,
            Err(ValidatorError::Rejected(RejectionReason::Expired))
        );
        assert_eq!(
            validator.validate("EARLYBIRD", Money::from_dollars(60)).await,
            Err(ValidatorError::Rejected(RejectionReason::NotYetActive))
        );
        assert_eq!(
            validator.validate("POPULAR", Money::from_dollars(60)).await,
            Err(ValidatorError::Rejected(RejectionReason::UsageLimitReached))
        );
    }

    #[tokio::test]
    async fn demo_gift_card_reports_balance() {
        let validator = DemoGiftCardValidator::new();

        let grant = validator
            .validate("gift100", Money::from_dollars(48))
            .await
            .unwrap();
        assert_eq!(grant.balance, Money::from_dollars(100));
    }

    #[tokio::test]
    async fn demo_gift_card_rejects_drained_card() {
        let validator = DemoGiftCardValidator::new();

        let result = validator.validate("DRAINED", Money::from_dollars(48)).await;
        assert_eq!(
            result,
            Err(ValidatorError::Rejected(RejectionReason::NoBalance))
        );
    }
}
