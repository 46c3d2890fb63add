//! # Bookflow Engine
//!
//! The cart/pricing engine and checkout state machine behind every bookflow
//! widget, plus the collaborator contracts the flow depends on.
//!
//! The engine is UI-framework-agnostic: state is an explicit object, every
//! mutation is a pure reducer transition, and all I/O (discount validation,
//! availability lookups, checkout submission) happens through injected
//! collaborator traits. The three widget skins in `bookflow-widgets` share
//! this single engine, so pricing arithmetic cannot drift between them.
//!
//! ## Pricing model
//!
//! - `subtotal` is the sum of cart line unit prices (prices fix at add time)
//! - at most one promo code discounts the subtotal (fixed or percentage)
//! - at most one gift card covers what remains *after* the promo
//! - the total floors at zero; the discount order is not user-reorderable
//!
//! ## Modules
//!
//! - [`money`]: cents-based money value object
//! - [`types`]: domain types (cart, discounts, draft, catalog entities)
//! - [`cart`]: the cart reducer
//! - [`checkout`]: the booking-flow state machine reducer
//! - [`validator`], [`availability`], [`catalog`], [`submitter`]:
//!   collaborator contracts with hosted and demo implementations
//! - [`mocks`]: scripted collaborators for tests
//! - [`config`]: environment-variable configuration

pub mod availability;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod mocks;
pub mod money;
pub mod submitter;
pub mod types;
pub mod validator;

pub use availability::{
    AvailabilityError, AvailabilitySource, DemoAvailabilitySource, HostedAvailabilitySource,
};
pub use cart::{CartAction, CartEnvironment, CartReducer, CartState};
pub use catalog::{CatalogError, CatalogSource, DemoCatalogSource, HostedCatalogSource};
pub use checkout::{
    BookingFlowReducer, DEFAULT_SUBMIT_TIMEOUT, FlowAction, FlowEnvironment, FlowState, Stage,
};
pub use config::Config;
pub use money::Money;
pub use submitter::{CheckoutSubmitter, DemoCheckoutSubmitter, HostedCheckoutSubmitter};
pub use types::{
    AppliedGiftCard, AppliedPromoCode, BookingConfirmation, BookingDraft, BookingReference, Cart,
    CartLine, CheckoutFailure, ContactDetails, DraftValidationError, Experience, ExperienceId,
    LineId, OrganizationId, PaymentDetails, PromoKind, RejectionReason, TicketSelection,
    TicketType, TicketTypeId, TimeSlot, Totals,
};
pub use validator::{
    DemoGiftCardValidator, DemoPromoValidator, DiscountRejection, GiftCardGrant,
    GiftCardValidator, HostedGiftCardValidator, HostedPromoValidator, PromoCodeValidator,
    PromoGrant, ValidatorError,
};
