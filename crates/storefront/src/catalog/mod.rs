//! Product catalog.
//!
//! The built-in [`StaticCatalog`] ships with the binary and is always
//! available. [`CatalogService`] prefers the remote service when one is
//! configured and falls back to the built-in data on any failure.

mod cache;
mod service;

use std::str::FromStr;
use std::sync::LazyLock;

use prasanna_farm_core::{Category, CategoryId, Product, ProductId};
use serde::Deserialize;
use tracing::error;

pub use service::CatalogService;

const CATALOG_JSON: &str = include_str!("../../content/catalog.json");

static BUILTIN: LazyLock<StaticCatalog> = LazyLock::new(|| {
    StaticCatalog::from_json(CATALOG_JSON).unwrap_or_else(|e| {
        error!(error = %e, "Built-in catalog is malformed, serving an empty catalog");
        StaticCatalog::default()
    })
});

#[derive(Deserialize)]
struct CatalogDocument {
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// Immutable in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    categories: Vec<Category>,
    products: Vec<Product>,
}

impl StaticCatalog {
    /// The catalog embedded in the binary.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Parse a catalog document (`{"categories": [...], "products": [...]}`).
    ///
    /// Category product counts are recomputed from the products.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid catalog JSON.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        Ok(Self::new(document.categories, document.products))
    }

    #[must_use]
    pub fn new(mut categories: Vec<Category>, products: Vec<Product>) -> Self {
        for category in &mut categories {
            let count = products
                .iter()
                .filter(|p| p.category == category.id)
                .count();
            category.product_count = u32::try_from(count).unwrap_or(u32::MAX);
        }
        Self {
            categories,
            products,
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Products in a category, in catalog order. `"all"` selects everything.
    #[must_use]
    pub fn products_by_category(&self, category: &CategoryId) -> Vec<Product> {
        if category.is_all() {
            return self.products.clone();
        }
        self.products
            .iter()
            .filter(|p| &p.category == category)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// The `count` best-rated products.
    #[must_use]
    pub fn featured(&self, count: usize) -> Vec<Product> {
        let mut products = self.products.clone();
        SortOrder::Rating.sort(&mut products);
        products.truncate(count);
        products
    }

    /// Case-insensitive substring match on name, description and category.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.category.as_str().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Up to `count` other products from the same category.
    #[must_use]
    pub fn related(&self, product: &Product, count: usize) -> Vec<Product> {
        related_from(self.products_by_category(&product.category), product, count)
    }
}

pub(crate) fn related_from(
    candidates: Vec<Product>,
    product: &Product,
    count: usize,
) -> Vec<Product> {
    candidates
        .into_iter()
        .filter(|p| p.id != product.id)
        .take(count)
        .collect()
}

/// Listing order for product pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::Featured, Self::PriceLow, Self::PriceHigh, Self::Rating];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
        }
    }

    /// Sort in place. Ties keep their relative order.
    pub fn sort(self, products: &mut [Product]) {
        match self {
            Self::Featured => {}
            Self::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
            Self::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            Self::Rating => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown sort order '{s}' (expected featured, price-low, price-high or rating)"
                )
            })
    }
}
