//! One storefront session: configuration, cart, catalog and checkout.

use std::sync::Arc;

use prasanna_farm_core::{CartSummary, OrderConfirmation, ProductId};
use tracing::info;

use crate::api::{ApiClient, CartApi, CatalogApi};
use crate::cart::{CartManager, CartStrategy, RemoteCartStrategy};
use crate::catalog::CatalogService;
use crate::checkout::{Checkout, CheckoutForm};
use crate::config::StorefrontConfig;
use crate::error::{Error, Result};
use crate::store::{FileStore, KeyValueStore};

/// Session state shared by every front end.
///
/// This struct is cheaply cloneable via `Arc`. The cart is created once per
/// session and every caller sees the same instance.
#[derive(Clone)]
pub struct StorefrontSession {
    inner: Arc<StorefrontSessionInner>,
}

struct StorefrontSessionInner {
    config: StorefrontConfig,
    cart: CartManager,
    catalog: CatalogService,
    checkout: Checkout,
}

impl StorefrontSession {
    /// Start a session backed by the file store in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the HTTP
    /// client cannot be built.
    pub async fn start(config: StorefrontConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir)?;
        Self::with_store(config, Arc::new(store)).await
    }

    /// Start a session over an arbitrary store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn with_store(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let (cart_remote, catalog_remote) = match &config.remote {
            Some(remote) => {
                let client = ApiClient::new(remote)?;
                let strategy: Arc<dyn CartStrategy> =
                    Arc::new(RemoteCartStrategy::new(CartApi::new(client.clone())));
                (Some(strategy), Some(CatalogApi::new(client)))
            }
            None => (None, None),
        };

        info!(
            remote_enabled = config.remote_enabled(),
            data_dir = %config.data_dir.display(),
            "Starting storefront session"
        );

        let cart = CartManager::initialize(store, cart_remote).await;
        let catalog = CatalogService::new(catalog_remote);
        let checkout = Checkout::new(config.checkout_delay);

        Ok(Self {
            inner: Arc::new(StorefrontSessionInner {
                config,
                cart,
                catalog,
                checkout,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Look a product up in the catalog and add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the catalog has no such product.
    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<CartSummary> {
        let product = self
            .inner
            .catalog
            .product(product_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("product {product_id}")))?;
        Ok(self.inner.cart.add_item(&product, quantity).await)
    }

    /// Place an order for the session cart.
    ///
    /// # Errors
    ///
    /// Returns `Error::Checkout` if the cart is empty or the form is invalid.
    pub async fn place_order(&self, form: &CheckoutForm) -> Result<OrderConfirmation> {
        Ok(self
            .inner
            .checkout
            .place_order(&self.inner.cart, form)
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use prasanna_farm_core::PaymentMethod;

    use super::*;
    use crate::store::{MemoryStore, load_cart};

    fn local_config() -> StorefrontConfig {
        let mut config = StorefrontConfig::local("unused");
        config.checkout_delay = Duration::ZERO;
        config
    }

    #[tokio::test]
    async fn test_add_to_cart_uses_catalog() {
        let store = Arc::new(MemoryStore::new());
        let session = StorefrontSession::with_store(local_config(), store.clone())
            .await
            .unwrap();

        let summary = session
            .add_to_cart(&ProductId::new("fruit-mango"), 2)
            .await
            .unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total_price.to_string(), "₹900");
        assert_eq!(load_cart(store.as_ref()).unwrap().total_items(), 2);

        let missing = session.add_to_cart(&ProductId::new("fruit-durian"), 1).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_session_shares_one_cart() {
        let session = StorefrontSession::with_store(local_config(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        let other = session.clone();

        session
            .add_to_cart(&ProductId::new("leafy-mint"), 1)
            .await
            .unwrap();
        assert_eq!(other.cart().total_items(), 1);
    }

    #[tokio::test]
    async fn test_file_backed_session_reloads_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = local_config();
        config.data_dir = dir.path().to_path_buf();

        let first = StorefrontSession::start(config.clone()).await.unwrap();
        first
            .add_to_cart(&ProductId::new("grain-rice"), 3)
            .await
            .unwrap();
        drop(first);

        let second = StorefrontSession::start(config).await.unwrap();
        assert_eq!(second.cart().total_items(), 3);
    }

    #[tokio::test]
    async fn test_place_order_through_session() {
        let session = StorefrontSession::with_store(local_config(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        session
            .add_to_cart(&ProductId::new("dairy-milk"), 1)
            .await
            .unwrap();

        let form = CheckoutForm {
            full_name: "Ravi Kumar".to_string(),
            email: "ravi@example.in".to_string(),
            phone: "9000000000".to_string(),
            address: "4 Market Street".to_string(),
            city: "Hassan".to_string(),
            pincode: "573201".to_string(),
            payment_method: PaymentMethod::Wallet,
        };
        let order = session.place_order(&form).await.unwrap();
        assert_eq!(order.total.to_string(), "₹140");
        assert!(session.cart().cart().is_empty());

        let again = session.place_order(&form).await;
        assert!(matches!(again, Err(Error::Checkout(_))));
    }
}
