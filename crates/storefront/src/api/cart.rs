//! Remote cart endpoints.

use prasanna_farm_core::ProductId;
use reqwest::Method;
use tracing::instrument;

use super::types::{AddItemRequest, RemoteCart, UpdateItemRequest};
use super::{ApiClient, ApiError, segment};

/// Typed access to the `/cart` endpoints.
#[derive(Clone)]
pub struct CartApi {
    client: ApiClient,
}

impl CartApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /cart`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<RemoteCart, ApiError> {
        self.client.get("/cart").await
    }

    /// `POST /cart/items`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<RemoteCart, ApiError> {
        let body = AddItemRequest {
            product_id: product_id.clone(),
            quantity,
        };
        self.client.send(Method::POST, "/cart/items", &body).await
    }

    /// `PUT /cart/items/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<RemoteCart, ApiError> {
        let endpoint = format!("/cart/items/{}", segment(product_id.as_str()));
        self.client
            .send(Method::PUT, &endpoint, &UpdateItemRequest { quantity })
            .await
    }

    /// `DELETE /cart/items/{id}`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<RemoteCart, ApiError> {
        let endpoint = format!("/cart/items/{}", segment(product_id.as_str()));
        self.client.delete(&endpoint).await
    }

    /// `DELETE /cart`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.client.delete_no_content("/cart").await
    }
}
