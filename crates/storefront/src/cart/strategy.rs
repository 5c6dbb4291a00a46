//! Apply strategies for cart mutations.
//!
//! The manager picks one strategy per call: the remote strategy when a
//! remote endpoint is configured, the local one otherwise. The local
//! strategy doubles as the fallback when the remote one fails.

use std::sync::Arc;

use async_trait::async_trait;
use prasanna_farm_core::{Cart, CartMutation};

use crate::api::{ApiError, CartApi};
use crate::store::{KeyValueStore, load_cart};

/// What a strategy decided about a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartUpdate {
    /// Replace the in-memory cart with this authoritative state.
    Replace(Cart),
    /// Apply the mutation to the in-memory cart with the local merge rules.
    Merge,
}

/// A way of loading and mutating the session cart.
#[async_trait]
pub trait CartStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Load the current cart.
    async fn fetch(&self) -> Result<Cart, ApiError>;

    /// Carry out a mutation.
    async fn apply(&self, mutation: &CartMutation) -> Result<CartUpdate, ApiError>;
}

/// Local-only strategy backed by the persistence store.
#[derive(Clone)]
pub struct LocalCartStrategy {
    store: Arc<dyn KeyValueStore>,
}

impl LocalCartStrategy {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}

#[async_trait]
impl CartStrategy for LocalCartStrategy {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch(&self) -> Result<Cart, ApiError> {
        Ok(load_cart(self.store.as_ref()).unwrap_or_default())
    }

    async fn apply(&self, _mutation: &CartMutation) -> Result<CartUpdate, ApiError> {
        Ok(CartUpdate::Merge)
    }
}

/// Strategy that forwards every mutation to the remote cart service.
#[derive(Clone)]
pub struct RemoteCartStrategy {
    api: CartApi,
}

impl RemoteCartStrategy {
    #[must_use]
    pub const fn new(api: CartApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CartStrategy for RemoteCartStrategy {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fetch(&self) -> Result<Cart, ApiError> {
        Ok(self.api.get().await?.into())
    }

    async fn apply(&self, mutation: &CartMutation) -> Result<CartUpdate, ApiError> {
        let remote = match mutation {
            CartMutation::Add { product, quantity } => {
                self.api.add_item(&product.id, *quantity).await?
            }
            CartMutation::UpdateQuantity {
                product_id,
                quantity,
            } => self.api.update_item(product_id, *quantity).await?,
            CartMutation::Remove { product_id } => self.api.remove_item(product_id).await?,
            CartMutation::Clear => {
                self.api.clear().await?;
                return Ok(CartUpdate::Replace(Cart::new()));
            }
        };
        Ok(CartUpdate::Replace(remote.into()))
    }
}
