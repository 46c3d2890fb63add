//! End-to-end booking demo.
//!
//! Drives the quick-book widget against the demo collaborators: pick a
//! slot, add tickets, bake a per-type promo, apply a cart-level gift card,
//! and check out — all without a backend.

use bookflow_engine::{
    CartEnvironment, CatalogSource, Config, DemoAvailabilitySource, DemoCatalogSource,
    DemoCheckoutSubmitter, DemoGiftCardValidator, DemoPromoValidator, FlowEnvironment,
};
use bookflow_core::environment::SystemClock;
use bookflow_widgets::session::{DiscountOutcome, SubmitOutcome};
use bookflow_widgets::{EmbedKey, QuickBookWidget, WidgetKind, embed_snippet};
use chrono::{Duration, NaiveTime, Utc};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    println!("=== Bookflow Quick-Book Demo ===\n");

    // Demo collaborators stand in for the hosted backend.
    let catalog = DemoCatalogSource::new();
    let experiences = catalog.experiences().await?;
    let experience = experiences
        .first()
        .cloned()
        .ok_or("demo catalog is empty")?;

    println!("Experience: {}", experience.name);
    for ticket_type in &experience.ticket_types {
        println!("  {} — {}", ticket_type.name, ticket_type.price);
    }

    let env = FlowEnvironment::new(
        Arc::new(SystemClock),
        DemoAvailabilitySource::shared(),
        DemoCheckoutSubmitter::shared(),
        CartEnvironment::new(DemoPromoValidator::shared(), DemoGiftCardValidator::shared()),
    );
    let widget = QuickBookWidget::new(env, experience.clone());

    // Tomorrow at 14:00
    let date = (Utc::now() + Duration::days(1)).date_naive();
    widget.open(date).await;

    let slots = widget.session().slots().await;
    println!("\nSlots on {date}: {} available", slots.len());
    let slot = NaiveTime::from_hms_opt(14, 0, 0).ok_or("bad slot time")?;
    widget.pick_slot(slot).await;
    println!("Picked {slot}");

    // Two adults, one with a baked 20% type promo
    let adult = experience.ticket_types[0].clone();
    widget.add_ticket(&adult.id).await;
    let discounted = widget
        .apply_ticket_type_promo(&adult.id, "SAVE20")
        .await
        .map_err(|e| e.to_string())?;
    println!("\nBaked SAVE20 into {}: {} → {}", adult.name, adult.price, discounted);
    widget.add_ticket(&adult.id).await;

    let totals = widget.session().totals().await;
    println!("Subtotal with 2 tickets: {}", totals.subtotal);

    // Cart-level gift card on top
    widget.session().proceed_to_cart().await;
    match widget.session().apply_gift_card("GIFT25").await {
        DiscountOutcome::Applied(totals) => {
            println!(
                "Applied GIFT25: -{} → total {}",
                totals.gift_card_discount, totals.total
            );
        },
        DiscountOutcome::Rejected(rejection) => println!("Gift card rejected: {rejection}"),
    }

    // Checkout
    widget.session().proceed_to_checkout().await;
    widget
        .session()
        .update_contact(bookflow_engine::ContactDetails {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        })
        .await;
    widget
        .session()
        .update_payment(bookflow_engine::PaymentDetails {
            card_number: "4242 4242 4242 4242".to_string(),
            expiry: "12/27".to_string(),
            cvv: "123".to_string(),
        })
        .await;

    match widget.session().submit().await {
        SubmitOutcome::Confirmed(reference) => println!("\nBooked! Reference: {reference}"),
        SubmitOutcome::Failed(failure) => println!("\nCheckout failed: {failure}"),
        SubmitOutcome::Invalid(error) => println!("\nFix your details: {error}"),
    }

    // The snippet an operator would paste to embed this widget
    let snippet = embed_snippet(
        &config.embed.base_url,
        WidgetKind::QuickBook,
        &EmbedKey::new("pk_demo_key".to_string()),
    );
    println!("\nEmbed snippet:\n{snippet}");

    println!("\n=== Demo Complete ===");
    Ok(())
}
