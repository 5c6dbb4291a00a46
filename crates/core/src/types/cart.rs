//! Shopping cart aggregate and its merge rules.
//!
//! A [`Cart`] holds at most one [`CartLineItem`] per product id. Every change
//! goes through [`Cart::apply`] with a [`CartMutation`]; the aggregates
//! (`total_items`, `total_price`) are recomputed on demand and never stored.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// A product snapshot plus the quantity ordered.
///
/// Serialized with the product fields flattened next to `quantity`, which is
/// the shape of the locally persisted cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Product id of this line.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// A change to a cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartMutation {
    /// Add `quantity` units of a product, merging with an existing line.
    Add { product: Product, quantity: u32 },
    /// Overwrite the quantity of an existing line.
    UpdateQuantity { product_id: ProductId, quantity: u32 },
    /// Drop the line for a product.
    Remove { product_id: ProductId },
    /// Empty the cart.
    Clear,
}

impl CartMutation {
    /// Build a quantity update.
    ///
    /// A quantity of zero or less is a removal, not an error and not a no-op.
    #[must_use]
    pub fn update_quantity(product_id: ProductId, quantity: i64) -> Self {
        if quantity <= 0 {
            return Self::Remove { product_id };
        }
        Self::UpdateQuantity {
            product_id,
            quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
        }
    }

    /// Short operation name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add_item",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::Remove { .. } => "remove_item",
            Self::Clear => "clear",
        }
    }

    /// Product the mutation targets, if any.
    #[must_use]
    pub const fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::Add { product, .. } => Some(&product.id),
            Self::UpdateQuantity { product_id, .. } | Self::Remove { product_id } => {
                Some(product_id)
            }
            Self::Clear => None,
        }
    }
}

/// Derived cart aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of price times quantity.
    pub total_price: Price,
}

/// The cart for one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, folding duplicate product ids together.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item.product, item.quantity);
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart and return its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product_id() == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Like [`Cart::total_price`], but `None` if any step overflows.
    #[must_use]
    pub fn checked_total_price(&self) -> Option<Price> {
        self.items.iter().try_fold(Price::ZERO, |total, item| {
            total.checked_add(item.product.price.checked_times(item.quantity)?)
        })
    }

    /// Current aggregates.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            line_count: self.len(),
            item_count: self.total_items(),
            total_price: self.total_price(),
        }
    }

    /// Apply a mutation in place.
    pub fn apply(&mut self, mutation: &CartMutation) {
        match mutation {
            CartMutation::Add { product, quantity } => self.add(product.clone(), *quantity),
            CartMutation::UpdateQuantity {
                product_id,
                quantity,
            } => self.set_quantity(product_id, *quantity),
            CartMutation::Remove { product_id } => self.remove(product_id),
            CartMutation::Clear => self.items.clear(),
        }
    }

    fn add(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartLineItem::new(product, quantity));
        }
    }

    fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id() == product_id)
        {
            existing.quantity = quantity;
        }
    }

    fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|item| item.product_id() != product_id);
    }
}
