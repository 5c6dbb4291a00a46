//! Remote product and category endpoints.

use prasanna_farm_core::{Category, CategoryId, Product, ProductId};
use tracing::instrument;

use super::types::{ProductListing, ProductQuery};
use super::{ApiClient, ApiError, segment};

/// Typed access to `/products` and `/categories`.
#[derive(Clone)]
pub struct CatalogApi {
    client: ApiClient,
}

impl CatalogApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /products`
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let endpoint = format!("/products{}", query.to_query_string());
        let listing: ProductListing = self.client.get(&endpoint).await?;
        Ok(listing.into_products())
    }

    /// `GET /products/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.client
            .get(&format!("/products/{}", segment(id.as_str())))
            .await
    }

    /// `GET /products/category/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category = %id))]
    pub async fn products_by_category(&self, id: &CategoryId) -> Result<Vec<Product>, ApiError> {
        self.client
            .get(&format!("/products/category/{}", segment(id.as_str())))
            .await
    }

    /// `GET /products/search?q=`
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        self.client
            .get(&format!("/products/search?q={}", urlencoding::encode(query)))
            .await
    }

    /// `GET /categories`
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.client.get("/categories").await
    }

    /// `GET /categories/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category = %id))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        self.client
            .get(&format!("/categories/{}", segment(id.as_str())))
            .await
    }
}
