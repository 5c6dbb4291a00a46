//! Local persistence store.
//!
//! A small synchronous key-value store that mirrors session state to disk.
//! The cart lives under [`CART_KEY`] as a JSON array of line items.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use prasanna_farm_core::Cart;
use thiserror::Error;
use tracing::{debug, warn};

/// Key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Durable string key-value storage.
///
/// Writes are synchronous: once `set` returns, the value is what the next
/// `get` (in this or a later session) observes.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        // Write beside the target, then rename over it
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

// =============================================================================
// Cart snapshot helpers
// =============================================================================

/// Read the persisted cart.
///
/// Returns `None` when nothing was ever saved. A snapshot that cannot be read
/// or parsed is treated as an empty cart.
pub fn load_cart(store: &dyn KeyValueStore) -> Option<Cart> {
    let raw = match store.get(CART_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Local cart unreadable, starting empty");
            return Some(Cart::new());
        }
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => {
            // Older snapshots may carry duplicate lines
            let cart = Cart::from_items(cart.into_items());
            if cart.checked_total_price().is_none() {
                warn!("Local cart snapshot totals overflow, starting empty");
                return Some(Cart::new());
            }
            debug!(lines = cart.len(), "Loaded local cart snapshot");
            Some(cart)
        }
        Err(e) => {
            warn!(error = %e, "Local cart snapshot corrupt, starting empty");
            Some(Cart::new())
        }
    }
}

/// Overwrite the persisted cart with the full line-item list.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_cart(store: &dyn KeyValueStore, cart: &Cart) -> Result<(), StoreError> {
    let raw = serde_json::to_string(cart)?;
    store.set(CART_KEY, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prasanna_farm_core::{CartMutation, CategoryId, Price, Product, ProductId};

    use super::*;

    fn tomato() -> Product {
        Product {
            id: ProductId::new("veg-tomato"),
            name: "Country Tomato".to_string(),
            description: "Vine-ripened".to_string(),
            price: Price::from_rupees(40),
            original_price: Some(Price::from_rupees(50)),
            image: "tomato.jpg".to_string(),
            category: CategoryId::new("vegetables"),
            rating: 4.6,
            reviews: 120,
            is_organic: true,
            is_fresh: true,
            unit: "1 kg".to_string(),
            stock: 30,
        }
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        assert_eq!(store.get("cart").unwrap(), None);
        store.set("cart", "[]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));

        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
        store.remove("cart").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_cart_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = Cart::new();
        cart.apply(&CartMutation::Add {
            product: tomato(),
            quantity: 3,
        });

        save_cart(&FileStore::open(dir.path()).unwrap(), &cart).unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(load_cart(&reopened), Some(cart));
    }

    #[test]
    fn test_load_missing_cart() {
        assert_eq!(load_cart(&MemoryStore::new()), None);
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let store = MemoryStore::new();
        store.set(CART_KEY, "{not json").unwrap();
        assert_eq!(load_cart(&store), Some(Cart::new()));

        store.set(CART_KEY, r#"[{"quantity": 2}]"#).unwrap();
        assert_eq!(load_cart(&store), Some(Cart::new()));
    }

    #[test]
    fn test_overflowing_snapshot_loads_empty() {
        let store = MemoryStore::new();
        store
            .set(
                CART_KEY,
                r#"[{"id":"x","price":1e20,"category":"dairy","quantity":4000000000}]"#,
            )
            .unwrap();

        let cart = load_cart(&store).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.summary().total_price, Price::ZERO);
    }

    #[test]
    fn test_reads_flat_snapshot_format() {
        let store = MemoryStore::new();
        store
            .set(
                CART_KEY,
                r#"[{"id":"veg-tomato","name":"Tomato","price":40,"category":"vegetables","quantity":2},
                    {"id":"veg-tomato","name":"Tomato","price":40,"category":"vegetables","quantity":1}]"#,
            )
            .unwrap();

        let cart = load_cart(&store).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Price::from_rupees(120));
    }
}
