//! WebAssembly module for the storefront SPA
//!
//! Provides client-side computation for:
//! - Cart line merging and quantity edits
//! - Wishlist and comparison lists
//! - Checkout price breakdowns

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::pricing::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("storefront-wasm loaded"));
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Merge duplicate cart lines by product
#[wasm_bindgen]
pub fn merge_cart(items_json: &str) -> Result<String, JsValue> {
    let items: Vec<CartItem> = parse(items_json, "cart")?;
    to_json(&merge_cart_items(items))
}

/// Add one unit of a product to the cart
#[wasm_bindgen]
pub fn add_cart_item(items_json: &str, item_json: &str) -> Result<String, JsValue> {
    let items: Vec<CartItem> = parse(items_json, "cart")?;
    let item: CartItem = parse(item_json, "item")?;
    to_json(&add_item(items, item))
}

/// Set a line's quantity; below one removes it
#[wasm_bindgen]
pub fn update_cart_quantity(items_json: &str, product: &str, qty: i32) -> Result<String, JsValue> {
    let items: Vec<CartItem> = parse(items_json, "cart")?;
    to_json(&update_quantity(items, product, qty))
}

/// Remove a product's line from the cart
#[wasm_bindgen]
pub fn remove_cart_item(items_json: &str, product: &str) -> Result<String, JsValue> {
    let items: Vec<CartItem> = parse(items_json, "cart")?;
    to_json(&remove_item(items, product))
}

fn entry_id(entry: &Value) -> Option<&str> {
    entry
        .get("_id")
        .or_else(|| entry.get("id"))
        .and_then(Value::as_str)
}

/// Append a product to a wishlist or comparison list unless already present
#[wasm_bindgen]
pub fn add_unique(list_json: &str, entry_json: &str) -> Result<String, JsValue> {
    let mut list: Vec<Value> = parse(list_json, "list")?;
    let entry: Value = parse(entry_json, "entry")?;
    let id = entry_id(&entry).ok_or_else(|| JsValue::from_str("Entry has no _id"))?;

    if !list.iter().any(|e| entry_id(e) == Some(id)) {
        list.push(entry);
    }
    to_json(&list)
}

/// Drop a product from a wishlist or comparison list
#[wasm_bindgen]
pub fn remove_by_id(list_json: &str, id: &str) -> Result<String, JsValue> {
    let list: Vec<Value> = parse(list_json, "list")?;
    let kept: Vec<Value> = list.into_iter().filter(|e| entry_id(e) != Some(id)).collect();
    to_json(&kept)
}

/// Price a checkout; `discount_percent` comes from a validated coupon
#[wasm_bindgen]
pub fn price_checkout(items_json: &str, discount_percent: f64) -> Result<String, JsValue> {
    let items: Vec<CartItem> = parse(items_json, "cart")?;
    let discount = Decimal::try_from(discount_percent).unwrap_or(Decimal::ZERO);
    let breakdown = price_items(&items, discount).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CART: &str = r#"[
        {"product":"a","name":"Mug","image":"/m.jpg","price":10,"qty":1},
        {"product":"b","name":"Cap","image":"/c.jpg","price":5,"qty":2},
        {"product":"a","name":"Mug","image":"/m.jpg","price":10,"qty":2}
    ]"#;

    #[test]
    fn test_merge_cart() {
        let merged: Vec<CartItem> = serde_json::from_str(&merge_cart(CART).unwrap()).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].qty, 3);
    }

    #[test]
    fn test_merge_cart_state_from_the_spa() {
        let state = r#"[
            {"_id":"a","name":"Mug","image":"/m.jpg","price":10,"countInStock":4,"qty":1,"product":"a"},
            {"_id":"a","name":"Mug","image":"/m.jpg","price":10,"countInStock":4,"qty":2,"product":"a"}
        ]"#;
        let merged: Vec<CartItem> = serde_json::from_str(&merge_cart(state).unwrap()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].qty, 3);
    }

    #[test]
    fn test_cart_edits() {
        let item = r#"{"_id":"c","name":"Bag","image":"/b.jpg","price":20}"#;
        let cart = add_cart_item("[]", item).unwrap();
        let cart = add_cart_item(&cart, item).unwrap();
        let items: Vec<CartItem> = serde_json::from_str(&cart).unwrap();
        assert_eq!(items[0].qty, 2);

        let cart = update_cart_quantity(&cart, "c", 0).unwrap();
        assert_eq!(cart, "[]");

        let cart = remove_cart_item(CART, "a").unwrap();
        let items: Vec<CartItem> = serde_json::from_str(&cart).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_wishlist_has_no_duplicates() {
        let list = add_unique("[]", r#"{"_id":"p1","name":"Mug"}"#).unwrap();
        let list = add_unique(&list, r#"{"_id":"p1","name":"Mug"}"#).unwrap();
        let list = add_unique(&list, r#"{"_id":"p2","name":"Cap"}"#).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&list).unwrap();
        assert_eq!(parsed.len(), 2);

        let list = remove_by_id(&list, "p1").unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&list).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(entry_id(&parsed[0]), Some("p2"));
    }

    #[test]
    fn test_price_checkout() {
        let json = price_checkout(CART, 0.0).unwrap();
        let breakdown: PriceBreakdown = serde_json::from_str(&json).unwrap();
        // 30 + 10 = 40 items, 10 shipping, 6 tax
        assert_eq!(breakdown.items_price, Decimal::from(40));
        assert_eq!(breakdown.total_price, Decimal::from(56));
    }

    #[test]
    fn test_price_checkout_rejects_huge_prices() {
        let cart = r#"[{"product":"a","name":"Mug","image":"/m.jpg","price":5e27,"qty":100}]"#;
        assert!(price_checkout(cart, 0.0).is_err());
    }
}
