//! Unified error handling with Sentry integration.
//!
//! Component errors (`ConfigError`, `ApiError`, `StoreError`,
//! `CheckoutError`) convert into the crate-level [`Error`]. Cart operations
//! never surface remote failures; those are absorbed by the local fallback
//! and only show up in logs and breadcrumbs.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Storefront error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote service client could not be built or called.
    #[error("Remote API error: {0}")]
    Api(#[from] ApiError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Order placement was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Requested product or category does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Capture infrastructure errors to Sentry.
    ///
    /// User errors (unknown ids, rejected checkouts) are only logged.
    pub fn report(&self) {
        if matches!(self, Self::Config(_) | Self::Api(_) | Self::Store(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::info!(error = %self, "Request rejected");
        }
    }
}

/// Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart and
/// checkout actions leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "add", Some(&[("product_id", "veg-tomato")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("product veg-kale".to_string());
        assert_eq!(err.to_string(), "Not found: product veg-kale");

        let err = Error::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: Cart is empty");
    }

    #[test]
    fn test_error_from_api() {
        let err: Error = ApiError::Status {
            status: 404,
            message: "Product not found".to_string(),
            body: None,
        }
        .into();
        assert!(matches!(err, Error::Api(ref e) if e.status() == 404));
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        add_breadcrumb("cart", "add", Some(&[("product_id", "veg-okra")]));
        add_breadcrumb("cart", "clear", None);
    }
}
