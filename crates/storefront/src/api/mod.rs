//! REST client for the optional remote storefront service.
//!
//! # Architecture
//!
//! - One [`ApiClient`] wraps `reqwest` with the base URL, JSON headers and an
//!   optional bearer token.
//! - [`CartApi`] and [`CatalogApi`] are thin typed views over it.
//! - Callers decide what to do on failure; nothing here retries or falls back.
//!
//! # Example
//!
//! ```rust,ignore
//! use prasanna_farm_storefront::api::{ApiClient, CartApi};
//!
//! let client = ApiClient::new(&remote_config)?;
//! let cart = CartApi::new(client.clone()).add_item(&product_id, 2).await?;
//! ```

mod cart;
mod catalog;
pub mod types;

pub use cart::CartApi;
pub use catalog::CatalogApi;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::RemoteConfig;

/// Errors returned by the remote service client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Network error. Please check your connection. ({0})")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        /// Structured error body, when the service sent JSON.
        body: Option<serde_json::Value>,
    },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failure, or 0 when no response was received.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::Network(_) | Self::Parse(_) => 0,
        }
    }
}

/// Client for the remote storefront REST service.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<SecretString>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RemoteConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                auth_token: config.auth_token.clone(),
            }),
        })
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{endpoint}", self.inner.base_url);
        let builder = self
            .inner
            .client
            .request(method, url)
            .header("Content-Type", "application/json");

        match &self.inner.auth_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str::<serde_json::Value>(&text).ok();
            let message = body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(serde_json::Value::as_str)
                .map_or_else(
                    || format!("HTTP error! status: {}", status.as_u16()),
                    str::to_string,
                );
            debug!(
                status = %status,
                message = %message,
                "Remote service returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
                body,
            });
        }

        Ok(text)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let text = self.execute(builder).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.execute_json(self.request(Method::GET, endpoint)).await
    }

    pub(crate) async fn send<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(body)?;
        self.execute_json(self.request(method, endpoint).body(payload))
            .await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.execute_json(self.request(Method::DELETE, endpoint))
            .await
    }

    /// Issue a request whose successful response carries no content.
    pub(crate) async fn delete_no_content(&self, endpoint: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, endpoint))
            .await
            .map(drop)
    }
}

/// Percent-encode a single path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_uses_message() {
        let err = ApiError::Status {
            status: 404,
            message: "Product not found".to_string(),
            body: None,
        };
        assert_eq!(err.to_string(), "Product not found");
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_parse_error_has_no_status() {
        let err = ApiError::from(serde_json::from_str::<u32>("nope").unwrap_err());
        assert_eq!(err.status(), 0);
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("veg-tomato"), "veg-tomato");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }
}
