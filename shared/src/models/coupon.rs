//! Discount coupon models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A percentage discount keyed by a code
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Always stored upper-case
    pub code: String,
    /// Discount percentage, e.g. 10 for 10%
    pub discount: Decimal,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// A coupon is usable up to and including its expiry instant
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expiry_date
    }
}

/// Admin input for issuing a coupon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponInput {
    pub code: String,
    pub discount: Decimal,
    pub expiry_date: DateTime<Utc>,
}

/// Canonical form of a coupon code
pub fn normalize_coupon_code(code: &str) -> String {
    code.trim().to_uppercase()
}
