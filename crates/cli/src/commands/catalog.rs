//! Catalog browsing commands.

use std::fmt::Write as _;

use prasanna_farm_core::{Category, CategoryId, Product, ProductId};
use prasanna_farm_storefront::catalog::SortOrder;
use prasanna_farm_storefront::{Error, StorefrontSession};
use serde::Serialize;

use super::{CommandResult, Output};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductDetail {
    product: Product,
    related: Vec<Product>,
}

pub async fn products(
    session: &StorefrontSession,
    out: Output,
    category: &CategoryId,
    sort: SortOrder,
) -> CommandResult {
    let products = session.catalog().products(category, sort).await;
    out.emit(&products, |products| product_table(products))
}

pub async fn product(session: &StorefrontSession, out: Output, id: &ProductId) -> CommandResult {
    let product = session
        .catalog()
        .product(id)
        .await
        .ok_or_else(|| Error::NotFound(format!("product {id}")))?;
    let related = session.catalog().related(&product, 4).await;
    out.emit(&ProductDetail { product, related }, render_detail)
}

pub async fn categories(session: &StorefrontSession, out: Output) -> CommandResult {
    let categories = session.catalog().categories().await;
    out.emit(&categories, |categories| category_table(categories))
}

pub async fn search(session: &StorefrontSession, out: Output, query: &str) -> CommandResult {
    let results = session.catalog().search(query).await;
    out.emit(&results, |results| {
        if results.is_empty() {
            format!("No products match '{query}'")
        } else {
            product_table(results)
        }
    })
}

pub async fn featured(session: &StorefrontSession, out: Output, count: usize) -> CommandResult {
    let products = session.catalog().featured(count).await;
    out.emit(&products, |products| product_table(products))
}

pub(crate) fn product_row(product: &Product) -> String {
    let mut row = format!(
        "{:<20} {:<24} {:>8} / {}",
        product.id.as_str(),
        product.name,
        product.price.to_string(),
        product.unit
    );
    if let Some(percent) = product.discount_percent() {
        let _ = write!(row, "  -{percent}%");
    }
    if !product.in_stock() {
        row.push_str("  (out of stock)");
    }
    row
}

fn product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products".to_string();
    }
    products
        .iter()
        .map(product_row)
        .collect::<Vec<_>>()
        .join("\n")
}

fn category_table(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| format!("{:<14} {:<18} {:>3} products", c.id.as_str(), c.name, c.product_count))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_detail(detail: &ProductDetail) -> String {
    let product = &detail.product;
    let mut text = format!("{}\n{}\n\n", product.name, product.description);

    let _ = write!(text, "Price:    {} / {}", product.price, product.unit);
    if let (Some(original), Some(percent)) = (product.original_price, product.discount_percent()) {
        let _ = write!(text, " (was {original}, {percent}% off)");
    }
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "Rating:   {:.1} ({} reviews)",
        product.rating, product.reviews
    );
    let _ = writeln!(text, "Category: {}", product.category);

    let mut tags = Vec::new();
    if product.is_organic {
        tags.push("organic");
    }
    if product.is_fresh {
        tags.push("fresh");
    }
    if !tags.is_empty() {
        let _ = writeln!(text, "Tags:     {}", tags.join(", "));
    }
    if product.in_stock() {
        let _ = writeln!(text, "Stock:    {}", product.stock);
    } else {
        let _ = writeln!(text, "Stock:    out of stock");
    }

    if !detail.related.is_empty() {
        let _ = write!(text, "\nYou may also like:\n{}", product_table(&detail.related));
    }
    text.trim_end().to_string()
}
