//! Order handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::{parse_id, AppJson};
use crate::middleware::CurrentUser;
use crate::services::order::orders_to_csv;
use crate::services::{DashboardService, OrderService};
use crate::AppState;
use shared::models::{CreateOrderInput, DashboardStats, Order, PaymentResult};

#[derive(Debug, Default, Deserialize)]
pub struct OrderExportQuery {
    pub format: Option<String>,
}

/// Place an order
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let service = OrderService::new(state.db.clone());
    let order = service.create_order(user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Caller's order history
pub async fn my_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db.clone());
    Ok(Json(service.list_user_orders(user.user_id).await?))
}

/// Single order (owner or admin)
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order_id = parse_id(&order_id, "Order")?;
    let service = OrderService::new(state.db.clone());
    Ok(Json(service.get_order(order_id, &user).await?))
}

/// Record payment
pub async fn pay_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<String>,
    body: Option<AppJson<PaymentResult>>,
) -> AppResult<Json<Order>> {
    let order_id = parse_id(&order_id, "Order")?;
    let payment = body.map(|AppJson(p)| p).unwrap_or_default();
    let service = OrderService::new(state.db.clone());
    Ok(Json(service.mark_paid(order_id, &user, payment).await?))
}

// ============================================================================
// Admin
// ============================================================================

/// Every order; `?format=csv` downloads a spreadsheet instead
pub async fn admin_list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderExportQuery>,
) -> AppResult<Response> {
    let service = OrderService::new(state.db.clone());
    let orders = service.list_all().await?;

    if query.format.as_deref() == Some("csv") {
        let body = orders_to_csv(&orders)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"orders.csv\""),
            ],
            body,
        )
            .into_response());
    }

    Ok(Json(orders).into_response())
}

/// Mark an order delivered
pub async fn admin_deliver_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order_id = parse_id(&order_id, "Order")?;
    let service = OrderService::new(state.db.clone());
    Ok(Json(service.mark_delivered(order_id).await?))
}

/// Dashboard totals
pub async fn admin_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let service = DashboardService::new(state.db.clone());
    Ok(Json(service.stats().await?))
}
