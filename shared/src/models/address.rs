//! Address book models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// A saved shipping address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for saving a new address
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressInput {
    #[validate(custom = "validate_not_blank")]
    pub full_name: String,
    #[validate(custom = "validate_not_blank")]
    pub address: String,
    #[validate(custom = "validate_not_blank")]
    pub city: String,
    #[validate(custom = "validate_not_blank")]
    pub postal_code: String,
    #[validate(custom = "validate_not_blank")]
    pub country: String,
    pub phone: Option<String>,
}

/// Partial address update; blank values leave the field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressInput {
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// Shipping destination captured on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(custom = "validate_not_blank")]
    pub address: String,
    #[validate(custom = "validate_not_blank")]
    pub city: String,
    #[validate(custom = "validate_not_blank")]
    pub postal_code: String,
    #[validate(custom = "validate_not_blank")]
    pub country: String,
}

impl From<&Address> for ShippingAddress {
    fn from(a: &Address) -> Self {
        Self {
            address: a.address.clone(),
            city: a.city.clone(),
            postal_code: a.postal_code.clone(),
            country: a.country.clone(),
        }
    }
}
