//! Cart commands.
//!
//! Every mutating command prints the resulting cart.

use std::fmt::Write as _;

use prasanna_farm_core::{Cart, CartLineItem, CartSummary, Price, ProductId};
use prasanna_farm_storefront::StorefrontSession;
use prasanna_farm_storefront::checkout::CheckoutQuote;
use serde::Serialize;

use super::{CommandResult, Output};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView<'a> {
    items: &'a [CartLineItem],
    #[serde(flatten)]
    summary: CartSummary,
    delivery_fee: Price,
    total: Price,
    remote_enabled: bool,
}

pub fn show(session: &StorefrontSession, out: Output) -> CommandResult {
    let cart = session.cart().cart();
    let quote = CheckoutQuote::for_cart(&cart);
    let view = CartView {
        items: cart.items(),
        summary: cart.summary(),
        delivery_fee: quote.delivery_fee,
        total: quote.total,
        remote_enabled: session.cart().is_remote_enabled(),
    };
    out.emit(&view, |_| render_cart(&cart))
}

pub async fn add(
    session: &StorefrontSession,
    out: Output,
    id: &ProductId,
    quantity: u32,
) -> CommandResult {
    session.add_to_cart(id, quantity).await?;
    show(session, out)
}

pub async fn update(
    session: &StorefrontSession,
    out: Output,
    id: &ProductId,
    quantity: i64,
) -> CommandResult {
    session.cart().update_quantity(id, quantity).await;
    show(session, out)
}

pub async fn remove(session: &StorefrontSession, out: Output, id: &ProductId) -> CommandResult {
    session.cart().remove_item(id).await;
    show(session, out)
}

pub async fn clear(session: &StorefrontSession, out: Output) -> CommandResult {
    session.cart().clear().await;
    show(session, out)
}

pub(crate) fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut text = String::new();
    for line in cart.items() {
        let _ = writeln!(
            text,
            "{:>3} x {:<24} {:>8} / {:<8} {:>9}",
            line.quantity,
            line.product.name,
            line.product.price.to_string(),
            line.product.unit,
            line.line_total().to_string()
        );
    }

    let quote = CheckoutQuote::for_cart(cart);
    let _ = writeln!(text, "\nItems:    {}", cart.total_items());
    let _ = writeln!(text, "Subtotal: {}", quote.subtotal);
    match quote.short_of_free_delivery() {
        Some(short) => {
            let _ = writeln!(
                text,
                "Delivery: {} (add {short} more for free delivery)",
                quote.delivery_fee
            );
        }
        None => {
            let _ = writeln!(text, "Delivery: Free");
        }
    }
    let _ = write!(text, "Total:    {}", quote.total);
    text
}

#[cfg(test)]
mod tests {
    use prasanna_farm_core::{CartMutation, CategoryId, Product};

    use super::*;

    fn product(id: &str, name: &str, rupees: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: Price::from_rupees(rupees),
            original_price: None,
            image: String::new(),
            category: CategoryId::new("vegetables"),
            rating: 4.0,
            reviews: 0,
            is_organic: true,
            is_fresh: true,
            unit: "1 kg".to_string(),
            stock: 10,
        }
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render_cart(&Cart::new()), "Your cart is empty");
    }

    #[test]
    fn test_render_cart_below_free_delivery() {
        let mut cart = Cart::new();
        cart.apply(&CartMutation::Add {
            product: product("veg-tomato", "Country Tomato", 40),
            quantity: 3,
        });

        let text = render_cart(&cart);
        assert!(text.contains("Country Tomato"));
        assert!(text.contains("Subtotal: ₹120"));
        assert!(text.contains("Delivery: ₹50 (add ₹380 more for free delivery)"));
        assert!(text.ends_with("Total:    ₹170"));
    }

    #[test]
    fn test_render_cart_free_delivery() {
        let mut cart = Cart::new();
        cart.apply(&CartMutation::Add {
            product: product("dairy-ghee", "Bilona Ghee", 650),
            quantity: 1,
        });

        let text = render_cart(&cart);
        assert!(text.contains("Delivery: Free"));
        assert!(text.ends_with("Total:    ₹650"));
    }
}
