//! Order placement.

use std::fmt::Write as _;

use prasanna_farm_core::{OrderConfirmation, PaymentStatus};
use prasanna_farm_storefront::StorefrontSession;
use prasanna_farm_storefront::checkout::CheckoutForm;

use super::{CommandResult, Output};

pub async fn place_order(
    session: &StorefrontSession,
    out: Output,
    form: &CheckoutForm,
) -> CommandResult {
    tracing::info!(
        delay_ms = session.config().checkout_delay.as_millis(),
        "Processing payment"
    );
    let order = session.place_order(form).await?;
    out.emit(&order, render_order)
}

fn render_order(order: &OrderConfirmation) -> String {
    let mut text = format!("Order {} {}\n\n", order.id, order.status);
    for line in &order.lines {
        let _ = writeln!(
            text,
            "{:>3} x {:<24} {:>9}",
            line.quantity,
            line.name,
            line.line_total.to_string()
        );
    }

    let delivery = if order.delivery_fee.is_zero() {
        "Free".to_string()
    } else {
        order.delivery_fee.to_string()
    };
    let payment = match order.payment_status {
        PaymentStatus::Completed => "paid",
        PaymentStatus::Pending => "due on delivery",
        PaymentStatus::Failed => "failed",
        PaymentStatus::Refunded => "refunded",
    };

    let _ = writeln!(text, "\nSubtotal: {}", order.subtotal);
    let _ = writeln!(text, "Delivery: {delivery}");
    let _ = writeln!(text, "Total:    {}", order.total);
    let _ = writeln!(text, "Payment:  {} ({payment})", order.payment_method.label());
    let _ = write!(
        text,
        "Ship to:  {}, {}, {} {}",
        order.shipping_address.full_name,
        order.shipping_address.street,
        order.shipping_address.city,
        order.shipping_address.pincode
    );
    text
}
