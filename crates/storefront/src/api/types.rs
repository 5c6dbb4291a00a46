//! Wire types for the remote storefront service.
//!
//! These mirror the service's JSON and are converted into core domain types
//! at the edge.

use prasanna_farm_core::{Cart, CartLineItem, Price, Product, ProductId};
use serde::{Deserialize, Serialize};

/// Cart as returned by every cart endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
    /// Server-computed total; informational only.
    #[serde(default)]
    pub total: Price,
    /// Server-computed item count; informational only.
    #[serde(default)]
    pub item_count: u64,
}

/// A line in a [`RemoteCart`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCartItem {
    pub product: Product,
    pub quantity: u32,
}

impl From<RemoteCart> for Cart {
    fn from(remote: RemoteCart) -> Self {
        Self::from_items(
            remote
                .items
                .into_iter()
                .map(|item| CartLineItem::new(item.product, item.quantity)),
        )
    }
}

impl From<&Cart> for RemoteCart {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| RemoteCartItem {
                    product: item.product.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            total: cart.total_price(),
            item_count: cart.total_items(),
        }
    }
}

/// Body of `POST /cart/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PUT /cart/items/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub current_page: u32,
}

/// `GET /products` answers either a page or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductListing {
    Page(Page<Product>),
    List(Vec<Product>),
}

impl ProductListing {
    #[must_use]
    pub fn into_products(self) -> Vec<Product> {
        match self {
            Self::Page(page) => page.content,
            Self::List(products) => products,
        }
    }
}

/// Query parameters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Encoded query string including the leading `?`, or empty.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.category {
            serializer.append_pair("category", category);
        }
        if let Some(sort_by) = &self.sort_by {
            serializer.append_pair("sortBy", sort_by);
        }
        if let Some(page) = self.page {
            serializer.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
        }

        let encoded = serializer.finish();
        if encoded.is_empty() {
            encoded
        } else {
            format!("?{encoded}")
        }
    }
}
