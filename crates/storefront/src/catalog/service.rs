//! Catalog reads with remote-first, static-fallback semantics.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use prasanna_farm_core::{Category, CategoryId, Product, ProductId};
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, CacheValue, CatalogExpiry};
use super::{SortOrder, StaticCatalog, related_from};
use crate::api::types::ProductQuery;
use crate::api::{ApiError, CatalogApi};

/// Shortest query sent to search.
pub const MIN_SEARCH_LEN: usize = 2;

/// Catalog provider for the storefront.
///
/// With a remote API configured, reads go to the remote service (retried
/// once) and successful responses are cached. Any failure, or no remote at
/// all, serves the built-in catalog instead.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    remote: Option<CatalogApi>,
    fallback: &'static StaticCatalog,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(remote: Option<CatalogApi>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .expire_after(CatalogExpiry)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                remote,
                fallback: StaticCatalog::builtin(),
                cache,
            }),
        }
    }

    #[must_use]
    pub fn is_remote_enabled(&self) -> bool {
        self.inner.remote.is_some()
    }

    /// Products in a category (`"all"` for everything), in the given order.
    #[instrument(skip(self), fields(category = %category, sort = %sort))]
    pub async fn products(&self, category: &CategoryId, sort: SortOrder) -> Vec<Product> {
        let mut products = self.listing(category).await;
        sort.sort(&mut products);
        products
    }

    /// A single product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Option<Product> {
        if let Some(api) = &self.inner.remote {
            let key = CacheKey::Product(id.clone());
            if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
                debug!("Cache hit for product");
                return Some(*product);
            }

            match retry_once("product", || api.product(id)).await {
                Ok(product) => {
                    self.inner
                        .cache
                        .insert(key, CacheValue::Product(Box::new(product.clone())))
                        .await;
                    return Some(product);
                }
                Err(e) => log_fallback("product", &e),
            }
        }

        self.inner.fallback.product(id).cloned()
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<Category> {
        if let Some(api) = &self.inner.remote {
            let key = CacheKey::Categories;
            if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&key).await {
                debug!("Cache hit for categories");
                return categories.as_ref().clone();
            }

            match retry_once("categories", || api.categories()).await {
                Ok(categories) => {
                    self.inner
                        .cache
                        .insert(key, CacheValue::Categories(Arc::new(categories.clone())))
                        .await;
                    return categories;
                }
                Err(e) => log_fallback("categories", &e),
            }
        }

        self.inner.fallback.categories().to_vec()
    }

    #[instrument(skip(self), fields(category = %id))]
    pub async fn category(&self, id: &CategoryId) -> Option<Category> {
        if let Some(api) = &self.inner.remote {
            let key = CacheKey::Category(id.clone());
            if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
                debug!("Cache hit for category");
                return Some(*category);
            }

            match retry_once("category", || api.category(id)).await {
                Ok(category) => {
                    self.inner
                        .cache
                        .insert(key, CacheValue::Category(Box::new(category.clone())))
                        .await;
                    return Some(category);
                }
                Err(e) => log_fallback("category", &e),
            }
        }

        self.inner.fallback.category(id).cloned()
    }

    /// Search products. Queries shorter than two characters match nothing.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Vec<Product> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }

        if let Some(api) = &self.inner.remote {
            let key = CacheKey::Search(query.to_lowercase());
            if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
                debug!("Cache hit for search");
                return products.as_ref().clone();
            }

            match retry_once("search", || api.search(query)).await {
                Ok(products) => {
                    self.inner
                        .cache
                        .insert(key, CacheValue::Products(Arc::new(products.clone())))
                        .await;
                    return products;
                }
                Err(e) => log_fallback("search", &e),
            }
        }

        self.inner.fallback.search(query)
    }

    /// The `count` best-rated products.
    pub async fn featured(&self, count: usize) -> Vec<Product> {
        let mut products = self
            .products(&CategoryId::new(CategoryId::ALL), SortOrder::Rating)
            .await;
        products.truncate(count);
        products
    }

    /// Up to `count` other products from the same category as `product`.
    pub async fn related(&self, product: &Product, count: usize) -> Vec<Product> {
        related_from(self.listing(&product.category).await, product, count)
    }

    async fn listing(&self, category: &CategoryId) -> Vec<Product> {
        if let Some(api) = &self.inner.remote {
            let key = CacheKey::Products(category.clone());
            if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
                debug!("Cache hit for products");
                return products.as_ref().clone();
            }

            let fetched = if category.is_all() {
                let query = ProductQuery::default();
                retry_once("products", || api.products(&query)).await
            } else {
                retry_once("products", || api.products_by_category(category)).await
            };

            match fetched {
                Ok(products) => {
                    self.inner
                        .cache
                        .insert(key, CacheValue::Products(Arc::new(products.clone())))
                        .await;
                    return products;
                }
                Err(e) => log_fallback("products", &e),
            }
        }

        self.inner.fallback.products_by_category(category)
    }
}

/// Run a remote read, retrying once on failure.
async fn retry_once<T, F, Fut>(operation: &str, call: F) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    match call().await {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!(operation, error = %e, "Remote catalog read failed, retrying once");
            call().await
        }
    }
}

fn log_fallback(operation: &str, error: &ApiError) {
    warn!(
        operation,
        error = %error,
        status = error.status(),
        "Remote catalog unavailable, serving built-in data"
    );
}
