//! Domain types for the booking flow.
//!
//! This module contains the value objects and entities shared by the cart
//! reducer, the checkout state machine, and the collaborator contracts:
//! catalog entities, cart lines, applied discounts, the derived totals, and
//! the customer-facing draft that checkout submission consumes.

use crate::money::Money;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a bookable experience
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExperienceId(Uuid);

impl ExperienceId {
    /// Creates a new random `ExperienceId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ExperienceId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExperienceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket type (e.g. "Adult", "Veteran")
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketTypeId(Uuid);

impl TicketTypeId {
    /// Creates a new random `TicketTypeId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketTypeId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketTypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a single cart line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(Uuid);

impl LineId {
    /// Creates a new random `LineId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `LineId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier scoping collaborator lookups to one venue operator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(Uuid);

impl OrganizationId {
    /// Creates a new random `OrganizationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `OrganizationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrganizationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference returned by the checkout submitter for a confirmed booking
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingReference(String);

impl BookingReference {
    /// Creates a new `BookingReference`
    #[must_use]
    pub const fn new(reference: String) -> Self {
        Self(reference)
    }

    /// Returns the reference as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Catalog entities (consumed read-only)
// ============================================================================

/// A purchasable ticket category with its own base price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Unique ticket type identifier
    pub id: TicketTypeId,
    /// Display name (e.g. "Adult", "Veteran")
    pub name: String,
    /// Current unit price
    pub price: Money,
}

impl TicketType {
    /// Creates a new `TicketType`
    #[must_use]
    pub const fn new(id: TicketTypeId, name: String, price: Money) -> Self {
        Self { id, name, price }
    }
}

/// A bookable experience (escape room, activity, event)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    /// Unique experience identifier
    pub id: ExperienceId,
    /// Display name
    pub name: String,
    /// Marketing description
    pub description: Option<String>,
    /// Maximum party size per slot
    pub capacity: u32,
    /// Duration of one session in minutes
    pub duration_minutes: u32,
    /// Cover image URL
    pub media_url: Option<String>,
    /// Ticket categories offered for this experience
    pub ticket_types: Vec<TicketType>,
}

impl Experience {
    /// Lowest ticket price, for "from $X" display
    #[must_use]
    pub fn price_from(&self) -> Option<Money> {
        self.ticket_types.iter().map(|t| t.price).min()
    }

    /// Looks up a ticket type by id
    #[must_use]
    pub fn ticket_type(&self, id: &TicketTypeId) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| &t.id == id)
    }
}

/// One bookable time on a given date
///
/// The availability contract: for `(experience, date)` the source returns
/// these ordered ascending by `time`. Sold-out slots stay in the list with
/// `is_available` false so the presentation can render them disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Start time of the slot
    pub time: NaiveTime,
    /// Whether the slot can still be booked
    pub is_available: bool,
}

// ============================================================================
// Cart
// ============================================================================

/// One entry per ticket type chosen, before lines are materialized
///
/// A selection with quantity 0 contributes nothing to the cart and may be
/// omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSelection {
    /// Ticket type being selected
    pub ticket_type_id: TicketTypeId,
    /// Unit price at selection time
    pub unit_price: Money,
    /// Number of units
    pub quantity: u32,
}

/// An individual unit purchased (one per seat/ticket)
///
/// A cart line's price is fixed at creation; changing cart-level discounts
/// never mutates existing lines. In the quick-book variant a promo code can
/// be baked into the unit price before the line is created, recorded here
/// for the receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Unique line identifier
    pub line_id: LineId,
    /// Ticket type this line was created from
    pub ticket_type_id: TicketTypeId,
    /// Ticket type display name at add time
    pub ticket_type_name: String,
    /// Price fixed at creation
    pub unit_price: Money,
    /// Promo code baked into `unit_price` at creation, if any
    pub per_line_promo_code: Option<String>,
}

/// How a promo code discounts the subtotal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum PromoKind {
    /// Fixed amount off the subtotal
    Fixed {
        /// Discount amount
        amount: Money,
    },
    /// Percentage off the subtotal
    Percentage {
        /// Discount percentage (0–100)
        percentage: u32,
    },
}

/// A promo code accepted by the validator, active at cart level
///
/// At most one is active; applying another silently replaces it. Created by
/// successful validation, destroyed by explicit removal or reset — never
/// auto-expired within a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromoCode {
    /// The code as entered
    pub code: String,
    /// Fixed or percentage discount
    pub kind: PromoKind,
}

impl AppliedPromoCode {
    /// Discount this code grants against the given subtotal
    ///
    /// Fixed discounts are capped at the subtotal; percentages truncate to
    /// the cent.
    #[must_use]
    pub const fn discount_for(&self, subtotal: Money) -> Money {
        match self.kind {
            PromoKind::Fixed { amount } => amount.min(subtotal),
            PromoKind::Percentage { percentage } => subtotal.percentage_of(percentage),
        }
    }
}

/// A gift card accepted by the validator, active at cart level
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedGiftCard {
    /// The code as entered
    pub code: String,
    /// Remaining stored value on the card
    pub balance: Money,
    /// Amount covered at apply time: `min(balance, subtotal − promo discount)`
    pub amount_applied: Money,
}

/// Monetary summary derived from the cart — never stored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of all line unit prices
    pub subtotal: Money,
    /// Promo code discount against the subtotal
    pub promo_discount: Money,
    /// Gift card coverage, computed after the promo discount
    pub gift_card_discount: Money,
    /// Amount the customer pays; never negative
    pub total: Money,
}

/// The cart aggregate: lines plus at most one promo code and one gift card
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Individual purchased units
    pub lines: Vec<CartLine>,
    /// Active cart-level promo code
    pub applied_promo_code: Option<AppliedPromoCode>,
    /// Active gift card
    pub applied_gift_card: Option<AppliedGiftCard>,
}

impl Cart {
    /// Creates an empty cart
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            applied_promo_code: None,
            applied_gift_card: None,
        }
    }

    /// Appends `quantity` fresh lines for a ticket type at a fixed unit price
    pub fn add_lines(
        &mut self,
        ticket_type: &TicketType,
        quantity: u32,
        per_line_promo_code: Option<&str>,
    ) {
        for _ in 0..quantity {
            self.lines.push(CartLine {
                line_id: LineId::new(),
                ticket_type_id: ticket_type.id,
                ticket_type_name: ticket_type.name.clone(),
                unit_price: ticket_type.price,
                per_line_promo_code: per_line_promo_code.map(str::to_owned),
            });
        }
    }

    /// Removes exactly one line; absent ids are a no-op
    ///
    /// Returns whether a line was removed.
    pub fn remove_line(&mut self, line_id: &LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.line_id != line_id);
        self.lines.len() != before
    }

    /// Whether the cart holds no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines (units) in the cart
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of units of one ticket type currently in the cart
    #[must_use]
    pub fn quantity_of(&self, ticket_type_id: &TicketTypeId) -> u32 {
        #[allow(clippy::cast_possible_truncation)] // carts are small, bounded collections
        let count = self
            .lines
            .iter()
            .filter(|line| &line.ticket_type_id == ticket_type_id)
            .count() as u32;
        count
    }

    /// Aggregates lines into one selection per ticket type and unit price
    ///
    /// Lines of the same type priced differently (a baked per-type promo)
    /// stay separate selections. Order follows first appearance in the cart.
    #[must_use]
    pub fn selections(&self) -> Vec<TicketSelection> {
        let mut selections: Vec<TicketSelection> = Vec::new();
        for line in &self.lines {
            if let Some(existing) = selections.iter_mut().find(|s| {
                s.ticket_type_id == line.ticket_type_id && s.unit_price == line.unit_price
            }) {
                existing.quantity += 1;
            } else {
                selections.push(TicketSelection {
                    ticket_type_id: line.ticket_type_id,
                    unit_price: line.unit_price,
                    quantity: 1,
                });
            }
        }
        selections
    }

    /// Sum of all line unit prices
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::ZERO, |acc, line| acc.saturating_add(line.unit_price))
    }

    /// Derives the monetary summary from current cart state
    ///
    /// Pure read: no side effects, and two calls without an intervening
    /// mutation return identical values. Discounts apply in the fixed order
    /// promo-then-gift-card; the gift card covers what remains *after* the
    /// promo, and the total floors at zero.
    #[must_use]
    pub fn totals(&self) -> Totals {
        let subtotal = self.subtotal();
        let promo_discount = self
            .applied_promo_code
            .as_ref()
            .map_or(Money::ZERO, |promo| promo.discount_for(subtotal));
        let after_promo = subtotal.saturating_sub(promo_discount);
        let gift_card_discount = self
            .applied_gift_card
            .as_ref()
            .map_or(Money::ZERO, |card| card.balance.min(after_promo));
        let total = after_promo.saturating_sub(gift_card_discount);

        Totals {
            subtotal,
            promo_discount,
            gift_card_discount,
            total,
        }
    }
}

// ============================================================================
// Discount rejection taxonomy
// ============================================================================

/// Why a validator refused a promo code or gift card
///
/// Wire spelling is kebab-case (`invalid-code`, `below-minimum-order`, …),
/// matching the hosted validator's response vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    /// The code does not exist for this organization
    InvalidCode,
    /// The code exists but its validity window has passed
    Expired,
    /// The code exists but its validity window has not started
    NotYetActive,
    /// The code's redemption limit has been reached
    UsageLimitReached,
    /// The order subtotal is below the code's minimum
    BelowMinimumOrder,
    /// The gift card has no remaining balance
    NoBalance,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidCode => "invalid-code",
            Self::Expired => "expired",
            Self::NotYetActive => "not-yet-active",
            Self::UsageLimitReached => "usage-limit-reached",
            Self::BelowMinimumOrder => "below-minimum-order",
            Self::NoBalance => "no-balance",
        };
        write!(f, "{text}")
    }
}

// ============================================================================
// Customer details and the booking draft
// ============================================================================

/// Client-local validation failures, surfaced before any collaborator call
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DraftValidationError {
    /// Contact name is empty
    #[error("Name is required")]
    EmptyName,
    /// Email does not look like an address
    #[error("A valid email address is required")]
    InvalidEmail,
    /// Phone number is empty
    #[error("Phone number is required")]
    EmptyPhone,
    /// Card number is not at least 13 digits after stripping spaces
    #[error("Card number is invalid")]
    InvalidCardNumber,
    /// Expiry field is empty
    #[error("Card expiry is required")]
    EmptyExpiry,
    /// CVV is shorter than 3 digits
    #[error("Security code is invalid")]
    InvalidCvv,
}

/// Customer contact fields collected at checkout
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Customer name
    pub name: String,
    /// Customer email
    pub email: String,
    /// Customer phone number
    pub phone: String,
}

impl ContactDetails {
    /// Validates the contact fields
    ///
    /// # Errors
    ///
    /// Returns the first failing [`DraftValidationError`]: empty name,
    /// implausible email, or empty phone.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        if self.name.trim().is_empty() {
            return Err(DraftValidationError::EmptyName);
        }
        if !looks_like_email(&self.email) {
            return Err(DraftValidationError::InvalidEmail);
        }
        if self.phone.trim().is_empty() {
            return Err(DraftValidationError::EmptyPhone);
        }
        Ok(())
    }
}

/// Minimal plausibility check: `local@domain.tld` with non-empty parts
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Payment fields collected at checkout
///
/// The engine never charges the card itself; these are passed through to the
/// checkout submitter, which exchanges them for a payment reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Card number, spaces allowed
    pub card_number: String,
    /// Expiry in MM/YY form
    pub expiry: String,
    /// Card security code
    pub cvv: String,
}

impl PaymentDetails {
    /// Validates the payment fields
    ///
    /// # Errors
    ///
    /// Returns the first failing [`DraftValidationError`]: a card number
    /// shorter than 13 digits after stripping spaces (or containing
    /// non-digits), an empty expiry, or a CVV shorter than 3 digits.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        let digits: String = self.card_number.chars().filter(|c| *c != ' ').collect();
        if digits.len() < 13 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DraftValidationError::InvalidCardNumber);
        }
        if self.expiry.trim().is_empty() {
            return Err(DraftValidationError::EmptyExpiry);
        }
        if self.cvv.trim().len() < 3 {
            return Err(DraftValidationError::InvalidCvv);
        }
        Ok(())
    }
}

/// The full in-progress reservation prior to submission
///
/// Exists only client-side: destroyed on success acknowledgement, retained
/// on failure so the customer can retry without re-entering selections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    /// Experience being booked
    pub experience_id: ExperienceId,
    /// Experience display name at selection time
    pub experience_name: String,
    /// Selected date
    pub date: NaiveDate,
    /// Selected time slot
    pub time: NaiveTime,
    /// Cart with lines and applied discounts
    pub cart: Cart,
    /// Customer contact fields
    pub contact: ContactDetails,
    /// Customer payment fields
    pub payment: PaymentDetails,
}

impl BookingDraft {
    /// Validates contact then payment fields
    ///
    /// # Errors
    ///
    /// Returns the first failing [`DraftValidationError`].
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        self.contact.validate()?;
        self.payment.validate()
    }
}

/// Successful checkout submission outcome
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// Reference for the created reservation record
    pub booking_reference: BookingReference,
}

/// Why a checkout submission did not produce a confirmation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutFailure {
    /// The payment was declined
    Declined {
        /// Decline reason from the submitter
        reason: String,
    },
    /// The backend reported an error creating the booking
    Backend {
        /// Error message from the submitter
        message: String,
    },
    /// The submission timed out with the outcome unknown
    ///
    /// The charge may or may not have gone through; the customer is told to
    /// contact support rather than blindly retry.
    OutcomeUnknown,
}

impl fmt::Display for CheckoutFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined { reason } => write!(f, "Payment declined: {reason}"),
            Self::Backend { message } => write!(f, "Booking failed: {message}"),
            Self::OutcomeUnknown => {
                write!(f, "We could not confirm your booking. Please contact support.")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adult_ticket() -> TicketType {
        TicketType::new(TicketTypeId::new(), "Adult".to_string(), Money::from_dollars(30))
    }

    #[test]
    fn cart_subtotal_sums_line_prices() {
        let mut cart = Cart::new();
        cart.add_lines(&adult_ticket(), 2, None);

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.subtotal(), Money::from_dollars(60));
        assert_eq!(cart.totals().total, Money::from_dollars(60));
    }

    #[test]
    fn remove_line_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_lines(&adult_ticket(), 1, None);
        let line_id = cart.lines[0].line_id;

        assert!(cart.remove_line(&line_id));
        assert!(!cart.remove_line(&line_id));
        assert!(cart.is_empty());
    }

    #[test]
    fn selections_aggregate_lines_by_type_and_price() {
        let mut cart = Cart::new();
        let adult = adult_ticket();
        cart.add_lines(&adult, 2, None);
        let discounted = TicketType::new(adult.id, adult.name.clone(), Money::from_dollars(24));
        cart.add_lines(&discounted, 1, Some("SAVE20"));

        let selections = cart.selections();
        assert_eq!(selections.len(), 2);
        assert_eq!(selections[0].quantity, 2);
        assert_eq!(selections[0].unit_price, Money::from_dollars(30));
        assert_eq!(selections[1].quantity, 1);
        assert_eq!(selections[1].unit_price, Money::from_dollars(24));
    }

    #[test]
    fn fixed_promo_caps_at_subtotal() {
        let promo = AppliedPromoCode {
            code: "BIG".to_string(),
            kind: PromoKind::Fixed {
                amount: Money::from_dollars(100),
            },
        };
        assert_eq!(promo.discount_for(Money::from_dollars(60)), Money::from_dollars(60));
    }

    #[test]
    fn totals_apply_promo_then_gift_card() {
        let mut cart = Cart::new();
        cart.add_lines(&adult_ticket(), 2, None);
        cart.applied_promo_code = Some(AppliedPromoCode {
            code: "SAVE20".to_string(),
            kind: PromoKind::Percentage { percentage: 20 },
        });
        cart.applied_gift_card = Some(AppliedGiftCard {
            code: "GIFT".to_string(),
            balance: Money::from_dollars(100),
            amount_applied: Money::from_dollars(48),
        });

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Money::from_dollars(60));
        assert_eq!(totals.promo_discount, Money::from_dollars(12));
        // Gift card covers the remainder after the promo, not raw subtotal
        assert_eq!(totals.gift_card_discount, Money::from_dollars(48));
        assert_eq!(totals.total, Money::ZERO);
    }

    #[test]
    fn totals_are_stable_across_reads() {
        let mut cart = Cart::new();
        cart.add_lines(&adult_ticket(), 3, None);
        cart.applied_promo_code = Some(AppliedPromoCode {
            code: "FIRST".to_string(),
            kind: PromoKind::Fixed {
                amount: Money::from_dollars(5),
            },
        });

        assert_eq!(cart.totals(), cart.totals());
    }

    #[test]
    fn rejection_reason_wire_spelling() {
        assert_eq!(RejectionReason::InvalidCode.to_string(), "invalid-code");
        assert_eq!(RejectionReason::BelowMinimumOrder.to_string(), "below-minimum-order");
        let json = serde_json::to_string(&RejectionReason::UsageLimitReached);
        assert_eq!(json.ok().as_deref(), Some("\"usage-limit-reached\""));
    }

    #[test]
    fn contact_validation_rejects_bad_email() {
        let contact = ContactDetails {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            phone: "555-0100".to_string(),
        };
        assert_eq!(contact.validate(), Err(DraftValidationError::InvalidEmail));

        let contact = ContactDetails {
            email: "ada@example.com".to_string(),
            ..contact
        };
        assert_eq!(contact.validate(), Ok(()));
    }

    #[test]
    fn payment_validation_strips_spaces_from_card_number() {
        let payment = PaymentDetails {
            card_number: "4242 4242 4242 4242".to_string(),
            expiry: "12/27".to_string(),
            cvv: "123".to_string(),
        };
        assert_eq!(payment.validate(), Ok(()));

        let short = PaymentDetails {
            card_number: "4242 4242".to_string(),
            ..payment.clone()
        };
        assert_eq!(short.validate(), Err(DraftValidationError::InvalidCardNumber));

        let letters = PaymentDetails {
            card_number: "4242 4242 4242 424x".to_string(),
            ..payment
        };
        assert_eq!(letters.validate(), Err(DraftValidationError::InvalidCardNumber));
    }
}
