//! Product catalogue and review models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_review_comment;

/// A catalogue product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Admin who created the product
    #[serde(rename = "user")]
    pub user_id: Option<Uuid>,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub price: Decimal,
    pub count_in_stock: i32,
    /// Mean of all review ratings, 0 when unreviewed
    pub rating: Decimal,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(skip)]
    pub product_id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Product with its reviews, returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<Review>,
}

/// One page of catalogue results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: i64,
    pub pages: i64,
    pub count: i64,
}

/// Search-as-you-type suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ProductSuggestion {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

/// Input for posting a review
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewInput {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(custom = "validate_review_comment")]
    pub comment: String,
}

/// Admin input for creating or editing a product; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub image: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub count_in_stock: Option<i32>,
}

/// Sample values used when an admin creates a product with an empty body
pub struct ProductDefaults;

impl ProductDefaults {
    pub const NAME: &'static str = "Sample name";
    pub const IMAGE: &'static str = "/images/sample.jpg";
    pub const BRAND: &'static str = "Sample brand";
    pub const CATEGORY: &'static str = "Sample category";
    pub const DESCRIPTION: &'static str = "Sample description";
}

impl ProductInput {
    /// Reject negative prices and stock counts
    pub fn check(&self) -> Result<(), &'static str> {
        if matches!(self.price, Some(p) if p < Decimal::ZERO) {
            return Err("Price cannot be negative");
        }
        if matches!(self.count_in_stock, Some(c) if c < 0) {
            return Err("Stock count cannot be negative");
        }
        Ok(())
    }
}

/// Average rating rounded to two decimal places
pub fn average_rating(ratings: &[i32]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    (Decimal::from(sum) / Decimal::from(ratings.len() as i64)).round_dp(2)
}
