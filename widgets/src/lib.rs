//! # Bookflow Widgets
//!
//! One booking flow, three presentation skins. Every widget is a thin
//! facade over the same engine store — [`session::BookingSession`] — so the
//! pricing arithmetic, discount ordering, and checkout state machine are
//! identical everywhere. What varies per widget is declared policy:
//!
//! - [`calendar::CalendarWidget`] — date-first entry, per-type quantities
//!   clamped to 0–10
//! - [`list::ListWidget`] — experience-list entry, per-type quantities
//!   clamped to 0–10
//! - [`quick_book::QuickBookWidget`] — single experience, unbounded one-unit
//!   adds, and per-ticket-type promo baking
//!
//! [`embed`] generates the iframe snippet and resize message for dropping a
//! widget into an operator's site.

pub mod calendar;
pub mod embed;
pub mod list;
pub mod quick_book;
pub mod session;

pub use calendar::CalendarWidget;
pub use embed::{EmbedKey, ResizeMessage, WidgetKind, embed_snippet, embed_url};
pub use list::ListWidget;
pub use quick_book::QuickBookWidget;
pub use session::{BookingSession, DiscountOutcome, QuantityPolicy, SubmitOutcome};
