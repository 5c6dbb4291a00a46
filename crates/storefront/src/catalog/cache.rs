//! Cache types for remote catalog responses.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use prasanna_farm_core::{Category, CategoryId, Product, ProductId};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products(CategoryId),
    Product(ProductId),
    Categories,
    Category(CategoryId),
    Search(String),
}

impl CacheKey {
    /// How long a response stays fresh.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        match self {
            Self::Products(_) => Duration::from_secs(2 * 60),
            Self::Product(_) => Duration::from_secs(5 * 60),
            Self::Categories | Self::Category(_) => Duration::from_secs(10 * 60),
            Self::Search(_) => Duration::from_secs(60),
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Categories(Arc<Vec<Category>>),
    Category(Box<Category>),
}

/// Per-key expiry policy.
pub struct CatalogExpiry;

impl Expiry<CacheKey, CacheValue> for CatalogExpiry {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(key.ttl())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttls() {
        assert_eq!(
            CacheKey::Products(CategoryId::new("all")).ttl(),
            Duration::from_secs(120)
        );
        assert_eq!(
            CacheKey::Product(ProductId::new("veg-okra")).ttl(),
            Duration::from_secs(300)
        );
        assert_eq!(CacheKey::Categories.ttl(), Duration::from_secs(600));
        assert_eq!(
            CacheKey::Search("mango".to_string()).ttl(),
            Duration::from_secs(60)
        );
    }
}
