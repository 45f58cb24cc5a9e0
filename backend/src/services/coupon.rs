//! Coupon service

use chrono::Utc;
use sqlx::{PgExecutor, PgPool};

use crate::error::{AppError, AppResult};
use shared::models::{normalize_coupon_code, Coupon, CreateCouponInput};
use shared::validation::{validate_coupon_code, validate_discount_percent};

const COUPON_COLUMNS: &str = "id, code, discount, expiry_date, created_at";

pub const COUPON_NOT_FOUND: &str = "Coupon not found or expired";

/// Look up a coupon by code and keep it only while it is still valid
pub async fn find_valid_coupon<'e>(
    executor: impl PgExecutor<'e>,
    code: &str,
) -> AppResult<Option<Coupon>> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {} FROM coupons WHERE code = $1",
        COUPON_COLUMNS
    ))
    .bind(normalize_coupon_code(code))
    .fetch_optional(executor)
    .await?;

    let now = Utc::now();
    Ok(coupon.filter(|c| c.is_valid_at(now)))
}

/// Coupon service
#[derive(Clone)]
pub struct CouponService {
    db: PgPool,
}

impl CouponService {
    /// Create a new CouponService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Public lookup; unknown and expired codes are both 404
    pub async fn get_valid(&self, code: &str) -> AppResult<Coupon> {
        find_valid_coupon(&self.db, code)
            .await?
            .ok_or(AppError::CouponUnavailable)
    }

    /// Every coupon, newest first
    pub async fn list_coupons(&self) -> AppResult<Vec<Coupon>> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {} FROM coupons ORDER BY created_at DESC",
            COUPON_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(coupons)
    }

    /// Issue a coupon
    pub async fn create_coupon(&self, input: CreateCouponInput) -> AppResult<Coupon> {
        let code = normalize_coupon_code(&input.code);

        validate_coupon_code(&code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;
        validate_discount_percent(input.discount).map_err(|msg| AppError::Validation {
            field: "discount".to_string(),
            message: msg.to_string(),
        })?;

        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO coupons (code, discount, expiry_date) VALUES ($1, $2, $3) RETURNING {}",
            COUPON_COLUMNS
        ))
        .bind(&code)
        .bind(input.discount)
        .bind(input.expiry_date)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "code"))?;

        tracing::info!(code = %coupon.code, "Coupon created");

        Ok(coupon)
    }

    /// Withdraw a coupon by code
    pub async fn delete_coupon(&self, code: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM coupons WHERE code = $1")
            .bind(normalize_coupon_code(code))
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Coupon".to_string()));
        }

        Ok(())
    }
}
