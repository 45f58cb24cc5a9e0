//! Order service
//!
//! Orders are priced on the server from the current catalogue; the client's
//! own totals are never trusted. Placing an order reserves stock in the same
//! transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::coupon::{find_valid_coupon, COUPON_NOT_FOUND};
use shared::models::{
    merge_and_check, CartItem, CreateOrderInput, Order, PaymentResult, ShippingAddress,
    UserSummary,
};
use shared::pricing::{price_items, PricingError};
use shared::validation::non_blank;

/// Order joined with its owner's summary
#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Option<Uuid>,
    user_name: Option<String>,
    user_email: Option<String>,
    order_items: Json<Vec<CartItem>>,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    payment_result: Option<Json<PaymentResult>>,
    coupon_code: Option<String>,
    discount_percent: Decimal,
    items_price: Decimal,
    shipping_price: Decimal,
    tax_price: Decimal,
    discount_amount: Decimal,
    total_price: Decimal,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        let user = match (row.user_id, row.user_name, row.user_email) {
            (Some(id), Some(name), Some(email)) => Some(UserSummary { id, name, email }),
            _ => None,
        };

        Order {
            id: row.id,
            user,
            order_items: row.order_items.0,
            shipping_address: row.shipping_address.0,
            payment_method: row.payment_method,
            payment_result: row.payment_result.map(|r| r.0),
            coupon_code: row.coupon_code,
            discount_percent: row.discount_percent,
            items_price: row.items_price,
            shipping_price: row.shipping_price,
            tax_price: row.tax_price,
            discount_amount: row.discount_amount,
            total_price: row.total_price,
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            is_delivered: row.is_delivered,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Catalogue fields needed to price a line
#[derive(Debug, FromRow)]
struct StockRow {
    id: Uuid,
    name: String,
    image: String,
    price: Decimal,
    count_in_stock: i32,
}

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.user_id, u.name AS user_name, u.email AS user_email,
           o.order_items, o.shipping_address, o.payment_method, o.payment_result,
           o.coupon_code, o.discount_percent, o.items_price, o.shipping_price,
           o.tax_price, o.discount_amount, o.total_price, o.is_paid, o.paid_at,
           o.is_delivered, o.delivered_at, o.created_at, o.updated_at
    FROM orders o
    LEFT JOIN users u ON u.id = o.user_id
"#;

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Place an order for the caller
    pub async fn create_order(&self, user_id: Uuid, input: CreateOrderInput) -> AppResult<Order> {
        if input.order_items.is_empty() {
            return Err(AppError::BadRequest("No order items".to_string()));
        }

        input.shipping_address.validate()?;

        let requested = merge_and_check(input.order_items)?;

        let mut tx = self.db.begin().await?;

        let mut priced = Vec::with_capacity(requested.len());
        let mut reserved = Vec::with_capacity(requested.len());
        for item in &requested {
            let product_id = Uuid::parse_str(&item.product)
                .map_err(|_| AppError::NotFound("Product".to_string()))?;

            let stock = sqlx::query_as::<_, StockRow>(
                "SELECT id, name, image, price, count_in_stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            if item.qty > stock.count_in_stock {
                return Err(AppError::BadRequest(format!(
                    "Insufficient stock for {}",
                    stock.name
                )));
            }

            reserved.push((stock.id, item.qty));
            priced.push(CartItem {
                product: stock.id.to_string(),
                name: stock.name,
                image: stock.image,
                price: stock.price,
                qty: item.qty,
            });
        }

        let (coupon_code, discount_percent) = match non_blank(input.coupon_code) {
            Some(code) => {
                let coupon = find_valid_coupon(&mut *tx, &code)
                    .await?
                    .ok_or_else(|| AppError::BadRequest(COUPON_NOT_FOUND.to_string()))?;
                (Some(coupon.code), coupon.discount)
            }
            None => (None, Decimal::ZERO),
        };

        let totals = price_items(&priced, discount_percent)?;

        for (product_id, qty) in &reserved {
            sqlx::query(
                "UPDATE products SET count_in_stock = count_in_stock - $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(product_id)
            .bind(qty)
            .execute(&mut *tx)
            .await?;
        }

        let payment_method = non_blank(Some(input.payment_method))
            .unwrap_or_else(shared::models::default_payment_method);

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO orders (
                user_id, order_items, shipping_address, payment_method, coupon_code,
                discount_percent, items_price, shipping_price, tax_price, discount_amount, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(Json(&priced))
        .bind(Json(&input.shipping_address))
        .bind(&payment_method)
        .bind(&coupon_code)
        .bind(discount_percent)
        .bind(totals.items_price)
        .bind(totals.shipping_price)
        .bind(totals.tax_price)
        .bind(totals.discount_amount)
        .bind(totals.total_price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            user_id = %user_id,
            total = %totals.total_price,
            "Order placed"
        );

        self.find_order(order_id).await
    }

    async fn find_order(&self, order_id: Uuid) -> AppResult<Order> {
        sqlx::query_as::<_, OrderRow>(&format!("{} WHERE o.id = $1", ORDER_SELECT))
            .bind(order_id)
            .fetch_optional(&self.db)
            .await?
            .map(Order::from)
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// An order visible to the caller: its owner or any admin
    pub async fn get_order(&self, order_id: Uuid, viewer: &AuthUser) -> AppResult<Order> {
        let order = self.find_order(order_id).await?;

        // Orders of other users are reported as missing
        if !viewer.is_admin && !order.is_owned_by(viewer.user_id) {
            return Err(AppError::NotFound("Order".to_string()));
        }

        Ok(order)
    }

    /// The caller's orders, newest first
    pub async fn list_user_orders(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE o.user_id = $1 ORDER BY o.created_at DESC",
            ORDER_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(orders.into_iter().map(Order::from).collect())
    }

    /// Record payment on an order the caller may see
    pub async fn mark_paid(
        &self,
        order_id: Uuid,
        viewer: &AuthUser,
        payment: PaymentResult,
    ) -> AppResult<Order> {
        self.get_order(order_id, viewer).await?;

        sqlx::query(
            r#"
            UPDATE orders
            SET is_paid = TRUE, paid_at = NOW(), payment_result = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .bind(Json(&payment))
        .execute(&self.db)
        .await?;

        tracing::info!(order_id = %order_id, "Order paid");

        self.find_order(order_id).await
    }

    // ========================================================================
    // Admin Operations
    // ========================================================================

    /// Every order, newest first
    pub async fn list_all(&self) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, OrderRow>(&format!(
            "{} ORDER BY o.created_at DESC",
            ORDER_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(orders.into_iter().map(Order::from).collect())
    }

    /// Mark an order delivered
    pub async fn mark_delivered(&self, order_id: Uuid) -> AppResult<Order> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET is_delivered = TRUE, delivered_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        tracing::info!(order_id = %order_id, "Order delivered");

        self.find_order(order_id).await
    }
}

/// Render orders as CSV for the admin export
pub fn orders_to_csv(orders: &[Order]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "id",
            "customer",
            "email",
            "created_at",
            "items",
            "items_price",
            "shipping_price",
            "tax_price",
            "discount_amount",
            "total_price",
            "coupon_code",
            "is_paid",
            "paid_at",
            "is_delivered",
            "delivered_at",
        ])
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

    let timestamp = |t: Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();

    for order in orders {
        let (name, email) = order
            .user
            .as_ref()
            .map(|u| (u.name.clone(), u.email.clone()))
            .unwrap_or_default();
        let items: i32 = order.order_items.iter().map(|i| i.qty).sum();

        writer
            .write_record([
                order.id.to_string(),
                name,
                email,
                order.created_at.to_rfc3339(),
                items.to_string(),
                order.items_price.to_string(),
                order.shipping_price.to_string(),
                order.tax_price.to_string(),
                order.discount_amount.to_string(),
                order.total_price.to_string(),
                order.coupon_code.clone().unwrap_or_default(),
                order.is_paid.to_string(),
                timestamp(order.paid_at),
                order.is_delivered.to_string(),
                timestamp(order.delivered_at),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))
}
