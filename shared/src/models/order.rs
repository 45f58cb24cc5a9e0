//! Order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CartItem, ShippingAddress, UserSummary};

/// Payment confirmation recorded when an order is paid
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentResult {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

/// A placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Owner summary; `None` once the account is deleted
    pub user: Option<UserSummary>,
    pub order_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub payment_result: Option<PaymentResult>,
    pub coupon_code: Option<String>,
    pub discount_percent: Decimal,
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether the given user placed this order
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user.as_ref().map(|u| u.id == user_id).unwrap_or(false)
    }
}

/// Body of `POST /api/orders`.
///
/// Client-side price fields are accepted for compatibility but ignored; totals
/// are always recomputed from the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub order_items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub coupon_code: Option<String>,
}

/// The storefront only offers cash on delivery
pub fn default_payment_method() -> String {
    "Cash on Delivery".to_string()
}

/// Admin dashboard totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub total_products: i64,
}
