//! Catalog records: products and categories.
//!
//! Both are immutable snapshots supplied by the catalog provider. Field names
//! follow the camelCase JSON used by the remote service and the local cart
//! snapshot.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product offered by the farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// List price before discount, if the product is on offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub image: String,
    pub category: CategoryId,
    #[serde(default)]
    pub rating: f32,
    /// Number of reviews behind `rating`.
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub is_organic: bool,
    #[serde(default)]
    pub is_fresh: bool,
    /// Unit label shown next to the price, e.g. `"500g"` or `"1 dozen"`.
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub stock: u32,
}

impl Product {
    /// Discount against the original price, as a rounded whole percentage.
    ///
    /// Returns `None` when there is no original price or it does not exceed
    /// the current price.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?.amount();
        if original <= self.price.amount() {
            return None;
        }

        let percent = (original - self.price.amount()) / original * Decimal::ONE_HUNDRED;
        percent
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .filter(|p| *p > 0)
    }

    /// Whether any stock remains.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub product_count: u32,
}
