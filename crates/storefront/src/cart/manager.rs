//! Session-scoped cart state manager.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use prasanna_farm_core::{Cart, CartLineItem, CartMutation, CartSummary, Price, Product, ProductId};
use tracing::{debug, error, instrument, warn};

use super::strategy::{CartStrategy, CartUpdate, LocalCartStrategy};
use crate::error::add_breadcrumb;
use crate::store::{KeyValueStore, save_cart};

/// Owns the cart of one session.
///
/// Every operation is applied through the remote strategy when one was
/// configured, falling back to the local merge when the remote call fails.
/// Whatever path served the call, the resulting cart is written through to
/// the local store before the operation returns.
///
/// Operations never fail from the caller's point of view; remote problems
/// are logged and absorbed.
pub struct CartManager {
    cart: Mutex<Cart>,
    local: LocalCartStrategy,
    remote: Option<Arc<dyn CartStrategy>>,
    in_flight: AtomicUsize,
}

impl CartManager {
    /// Start a session cart.
    ///
    /// With a remote strategy the remote cart is fetched; if that fails, or
    /// without a remote, the local snapshot is used (empty if none).
    #[instrument(skip_all, fields(remote_enabled = remote.is_some()))]
    pub async fn initialize(
        store: Arc<dyn KeyValueStore>,
        remote: Option<Arc<dyn CartStrategy>>,
    ) -> Self {
        let manager = Self {
            cart: Mutex::new(Cart::new()),
            local: LocalCartStrategy::new(store),
            remote,
            in_flight: AtomicUsize::new(0),
        };

        let fetched = match &manager.remote {
            Some(remote) => {
                let _busy = manager.busy();
                remote.fetch().await
            }
            None => manager.local.fetch().await,
        };

        let cart = match fetched {
            Ok(cart) => cart,
            Err(e) => {
                warn!(
                    error = %e,
                    status = e.status(),
                    "Failed to fetch remote cart, using local snapshot"
                );
                manager.local.fetch().await.unwrap_or_default()
            }
        };

        {
            let mut current = manager.lock();
            *current = cart;
            manager.persist(&current);
            debug!(lines = current.len(), items = current.total_items(), "Cart initialized");
        }

        manager
    }

    /// Add `quantity` units of a product. Adding zero units does nothing.
    pub async fn add_item(&self, product: &Product, quantity: u32) -> CartSummary {
        if quantity == 0 {
            debug!(product_id = %product.id, "Ignoring add of zero units");
            return self.summary();
        }
        self.reconcile(CartMutation::Add {
            product: product.clone(),
            quantity,
        })
        .await
    }

    /// Remove the line for a product.
    pub async fn remove_item(&self, product_id: &ProductId) -> CartSummary {
        self.reconcile(CartMutation::Remove {
            product_id: product_id.clone(),
        })
        .await
    }

    /// Set the quantity of a line; zero or less removes it.
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: i64) -> CartSummary {
        self.reconcile(CartMutation::update_quantity(product_id.clone(), quantity))
            .await
    }

    /// Empty the cart. Always ends empty, whatever the remote says.
    pub async fn clear(&self) -> CartSummary {
        self.reconcile(CartMutation::Clear).await
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.lock().clone()
    }

    /// Snapshot of the current line items.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock().items().to_vec()
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.lock().summary()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lock().total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lock().total_price()
    }

    /// Whether a remote call is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Whether this session was started with a remote cart service.
    #[must_use]
    pub const fn is_remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    #[instrument(skip(self, mutation), fields(operation = mutation.name()))]
    async fn reconcile(&self, mutation: CartMutation) -> CartSummary {
        match mutation.product_id() {
            Some(id) => add_breadcrumb(
                "cart",
                mutation.name(),
                Some(&[("product_id", id.as_str())]),
            ),
            None => add_breadcrumb("cart", mutation.name(), None),
        }

        let strategy: &dyn CartStrategy = match &self.remote {
            Some(remote) => remote.as_ref(),
            None => &self.local,
        };

        let outcome = if self.remote.is_some() {
            let _busy = self.busy();
            strategy.apply(&mutation).await
        } else {
            strategy.apply(&mutation).await
        };

        let update = outcome.unwrap_or_else(|e| {
            warn!(
                strategy = strategy.name(),
                error = %e,
                status = e.status(),
                "Remote cart call failed, applying locally"
            );
            CartUpdate::Merge
        });

        let mut cart = self.lock();
        match update {
            CartUpdate::Replace(next) => *cart = next,
            CartUpdate::Merge => cart.apply(&mutation),
        }
        self.persist(&cart);

        let summary = cart.summary();
        debug!(
            lines = summary.line_count,
            items = summary.item_count,
            total = %summary.total_price,
            "Cart updated"
        );
        summary
    }

    fn persist(&self, cart: &Cart) {
        if let Err(e) = save_cart(self.local.store(), cart) {
            error!(error = %e, "Failed to write local cart snapshot");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn busy(&self) -> BusyGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        BusyGuard(&self.in_flight)
    }
}

/// Decrements the in-flight counter when the remote call settles.
struct BusyGuard<'a>(&'a AtomicUsize);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
