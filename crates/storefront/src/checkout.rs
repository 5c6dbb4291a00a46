//! Simulated checkout.
//!
//! No payment gateway is involved: placing an order validates the form,
//! waits for the configured processing delay, freezes the cart into an
//! [`OrderConfirmation`] and empties the cart.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use prasanna_farm_core::{
    Cart, Email, OrderConfirmation, OrderId, OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
    Price, ShippingAddress,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use crate::cart::CartManager;
use crate::error::add_breadcrumb;

/// Orders at or above this subtotal ship free.
pub const FREE_DELIVERY_THRESHOLD: Price = Price::new(Decimal::from_parts(500, 0, 0, false, 0));
/// Flat delivery fee below the threshold.
pub const DELIVERY_FEE: Price = Price::new(Decimal::from_parts(50, 0, 0, false, 0));

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid checkout details: {}", join_fields(.0))]
    Invalid(Vec<FieldError>),
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Price breakdown shown before placing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutQuote {
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
}

impl CheckoutQuote {
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        let subtotal = cart.total_price();
        let delivery_fee = if subtotal >= FREE_DELIVERY_THRESHOLD {
            Price::ZERO
        } else {
            DELIVERY_FEE
        };
        Self {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }

    /// How much more the customer must add to ship free, if anything.
    #[must_use]
    pub fn short_of_free_delivery(&self) -> Option<Price> {
        (self.subtotal < FREE_DELIVERY_THRESHOLD)
            .then(|| Price::new(FREE_DELIVERY_THRESHOLD.amount() - self.subtotal.amount()))
    }
}

/// Customer details entered at checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Check every field and build the shipping address.
    ///
    /// # Errors
    ///
    /// Returns every field that is missing or malformed.
    pub fn validate(&self) -> Result<ShippingAddress, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut required = |field: &'static str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                errors.push(FieldError {
                    field,
                    message: "is required".to_string(),
                });
            }
            value.to_string()
        };

        let full_name = required("full_name", &self.full_name);
        let raw_email = required("email", &self.email);
        let phone = required("phone", &self.phone);
        let street = required("address", &self.address);
        let city = required("city", &self.city);
        let pincode = required("pincode", &self.pincode);

        let email = if raw_email.is_empty() {
            None
        } else {
            match Email::parse(&raw_email) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.push(FieldError {
                        field: "email",
                        message: e.to_string(),
                    });
                    None
                }
            }
        };

        match email {
            Some(email) if errors.is_empty() => Ok(ShippingAddress {
                full_name,
                email,
                phone,
                street,
                city,
                pincode,
            }),
            _ => Err(errors),
        }
    }
}

/// Simulated order placement.
#[derive(Debug, Clone, Copy)]
pub struct Checkout {
    processing_delay: Duration,
}

impl Checkout {
    #[must_use]
    pub const fn new(processing_delay: Duration) -> Self {
        Self { processing_delay }
    }

    /// Place an order for the current cart.
    ///
    /// On success the cart is cleared through the cart manager, so the
    /// local snapshot (and the remote cart, when enabled) ends empty.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart and
    /// `CheckoutError::Invalid` when the form does not validate. The cart is
    /// untouched in both cases.
    #[instrument(skip_all, fields(payment_method = %form.payment_method))]
    pub async fn place_order(
        &self,
        cart: &CartManager,
        form: &CheckoutForm,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let snapshot = cart.cart();
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let shipping_address = form.validate().map_err(CheckoutError::Invalid)?;

        add_breadcrumb(
            "checkout",
            "Placing order",
            Some(&[("payment_method", form.payment_method.as_str())]),
        );
        tokio::time::sleep(self.processing_delay).await;

        let quote = CheckoutQuote::for_cart(&snapshot);
        let payment_status = if form.payment_method.is_prepaid() {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Pending
        };
        let order = OrderConfirmation {
            id: OrderId::generate(),
            placed_at: Utc::now(),
            lines: snapshot.items().iter().map(OrderLine::from).collect(),
            subtotal: quote.subtotal,
            delivery_fee: quote.delivery_fee,
            total: quote.total,
            payment_method: form.payment_method,
            shipping_address,
            status: OrderStatus::Confirmed,
            payment_status,
        };

        cart.clear().await;

        info!(
            order_id = %order.id,
            items = order.item_count(),
            total = %order.total,
            "Order placed"
        );
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use prasanna_farm_core::{CategoryId, Product, ProductId};

    use super::*;
    use crate::store::{MemoryStore, load_cart};

    fn product(id: &str, rupees: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Price::from_rupees(rupees),
            original_price: None,
            image: String::new(),
            category: CategoryId::new("dairy"),
            rating: 4.5,
            reviews: 10,
            is_organic: true,
            is_fresh: true,
            unit: "1 litre".to_string(),
            stock: 5,
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Asha Rao".to_string(),
            email: "asha@example.in".to_string(),
            phone: "9876543210".to_string(),
            address: "12 Temple Road".to_string(),
            city: "Mysuru".to_string(),
            pincode: "570001".to_string(),
            payment_method: PaymentMethod::Upi,
        }
    }

    fn cart_of(lines: &[(i64, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (i, (rupees, quantity)) in lines.iter().enumerate() {
            cart.apply(&prasanna_farm_core::CartMutation::Add {
                product: product(&format!("p{i}"), *rupees),
                quantity: *quantity,
            });
        }
        cart
    }

    #[test]
    fn test_delivery_fee_threshold() {
        let below = CheckoutQuote::for_cart(&cart_of(&[(90, 5)]));
        assert_eq!(below.delivery_fee, DELIVERY_FEE);
        assert_eq!(below.total, Price::from_rupees(500));
        assert_eq!(below.short_of_free_delivery(), Some(Price::from_rupees(50)));

        let at = CheckoutQuote::for_cart(&cart_of(&[(100, 5)]));
        assert_eq!(at.delivery_fee, Price::ZERO);
        assert_eq!(at.total, Price::from_rupees(500));
        assert_eq!(at.short_of_free_delivery(), None);
    }

    #[test]
    fn test_form_validation_lists_every_field() {
        let errors = CheckoutForm::default().validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            ["full_name", "email", "phone", "address", "city", "pincode"]
        );
    }

    #[test]
    fn test_form_validation_trims_and_checks_email() {
        let mut bad = form();
        bad.email = "not-an-email".to_string();
        bad.city = "   ".to_string();
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "email"));
        assert!(errors.iter().any(|e| e.field == "city"));

        let mut padded = form();
        padded.full_name = "  Asha Rao ".to_string();
        assert_eq!(padded.validate().unwrap().full_name, "Asha Rao");
    }

    #[tokio::test]
    async fn test_place_order_clears_cart() {
        let store = Arc::new(MemoryStore::new());
        let cart = CartManager::initialize(store.clone(), None).await;
        cart.add_item(&product("dairy-milk", 90), 2).await;
        cart.add_item(&product("dairy-ghee", 650), 1).await;

        let order = Checkout::new(Duration::ZERO)
            .place_order(&cart, &form())
            .await
            .unwrap();

        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.subtotal, Price::from_rupees(830));
        assert_eq!(order.delivery_fee, Price::ZERO);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert!(order.id.as_str().starts_with("PF-"));

        assert!(cart.cart().is_empty());
        assert!(load_cart(store.as_ref()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cash_on_delivery_is_pending() {
        let cart = CartManager::initialize(Arc::new(MemoryStore::new()), None).await;
        cart.add_item(&product("dairy-curd", 60), 1).await;

        let mut cod = form();
        cod.payment_method = PaymentMethod::Cod;
        let order = Checkout::new(Duration::ZERO)
            .place_order(&cart, &cod)
            .await
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.total, Price::from_rupees(110));
    }

    #[tokio::test]
    async fn test_rejected_orders_keep_cart() {
        let checkout = Checkout::new(Duration::ZERO);
        let cart = CartManager::initialize(Arc::new(MemoryStore::new()), None).await;

        assert!(matches!(
            checkout.place_order(&cart, &form()).await,
            Err(CheckoutError::EmptyCart)
        ));

        cart.add_item(&product("dairy-paneer", 120), 1).await;
        let err = checkout
            .place_order(&cart, &CheckoutForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(ref fields) if fields.len() == 6));
        assert!(err.to_string().starts_with("Invalid checkout details: full_name"));
        assert_eq!(cart.total_items(), 1);
    }
}
