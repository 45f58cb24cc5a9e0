//! Admin dashboard statistics

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::AppResult;
use shared::models::DashboardStats;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Order count, revenue over all orders and catalogue size
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let (total_orders, total_revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(total_price), 0) FROM orders",
        )
        .fetch_one(&self.db)
        .await?;

        let total_products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db)
            .await?;

        Ok(DashboardStats {
            total_orders,
            total_revenue,
            total_products,
        })
    }
}
