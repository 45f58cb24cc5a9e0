//! Shopping cart models and line-item merging

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A line in a cart or an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawCartItem")]
pub struct CartItem {
    pub product: String,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub qty: i32,
}

/// Cart line as clients post it.
///
/// The SPA spreads the product document into the line, so `_id` and
/// `product` usually arrive together; `product` wins when both are set.
#[derive(Deserialize)]
struct RawCartItem {
    #[serde(default)]
    product: Option<String>,
    #[serde(default, rename = "_id")]
    id: Option<String>,
    name: String,
    image: String,
    price: Decimal,
    #[serde(default = "default_qty")]
    qty: i32,
}

fn default_qty() -> i32 {
    1
}

impl TryFrom<RawCartItem> for CartItem {
    type Error = CartError;

    fn try_from(raw: RawCartItem) -> Result<Self, Self::Error> {
        let product = raw
            .product
            .filter(|p| !p.is_empty())
            .or(raw.id.filter(|id| !id.is_empty()))
            .ok_or(CartError::MissingProduct)?;
        Ok(CartItem {
            product,
            name: raw.name,
            image: raw.image,
            price: raw.price,
            qty: raw.qty,
        })
    }
}

/// A user's server-side cart (one per user)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub cart_items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/cart`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartInput {
    pub cart_items: Vec<CartItem>,
}

/// Cart errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity for product {0} must be at least 1")]
    InvalidQuantity(String),
    #[error("Cart item is missing a product id")]
    MissingProduct,
}

/// Merge lines that refer to the same product.
///
/// Quantities are summed into the first occurrence, which keeps its position
/// and its name/image/price.
pub fn merge_cart_items(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|m| m.product == item.product) {
            Some(existing) => existing.qty = existing.qty.saturating_add(item.qty),
            None => merged.push(item),
        }
    }
    merged
}

/// Merge and reject lines whose merged quantity is below one
pub fn merge_and_check(items: Vec<CartItem>) -> Result<Vec<CartItem>, CartError> {
    let merged = merge_cart_items(items);
    if let Some(bad) = merged.iter().find(|i| i.qty < 1) {
        return Err(CartError::InvalidQuantity(bad.product.clone()));
    }
    Ok(merged)
}

/// Add one unit of a product, appending a new line when absent
pub fn add_item(mut items: Vec<CartItem>, item: CartItem) -> Vec<CartItem> {
    match items.iter_mut().find(|i| i.product == item.product) {
        Some(existing) => existing.qty = existing.qty.saturating_add(1),
        None => items.push(CartItem { qty: 1, ..item }),
    }
    items
}

/// Set a line's quantity; anything below one removes the line
pub fn update_quantity(items: Vec<CartItem>, product: &str, qty: i32) -> Vec<CartItem> {
    if qty < 1 {
        return remove_item(items, product);
    }
    items
        .into_iter()
        .map(|i| if i.product == product { CartItem { qty, ..i } } else { i })
        .collect()
}

/// Drop a product's line
pub fn remove_item(items: Vec<CartItem>, product: &str) -> Vec<CartItem> {
    items.into_iter().filter(|i| i.product != product).collect()
}
