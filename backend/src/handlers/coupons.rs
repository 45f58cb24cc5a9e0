//! Coupon handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::handlers::AppJson;
use crate::services::CouponService;
use crate::AppState;
use shared::models::{Coupon, CreateCouponInput};
use shared::types::MessageResponse;

/// Public lookup of a still-valid coupon
pub async fn get_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<Coupon>> {
    let service = CouponService::new(state.db.clone());
    Ok(Json(service.get_valid(&code).await?))
}

pub async fn admin_list_coupons(State(state): State<AppState>) -> AppResult<Json<Vec<Coupon>>> {
    let service = CouponService::new(state.db.clone());
    Ok(Json(service.list_coupons().await?))
}

pub async fn admin_create_coupon(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateCouponInput>,
) -> AppResult<(StatusCode, Json<Coupon>)> {
    let service = CouponService::new(state.db.clone());
    let coupon = service.create_coupon(body).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn admin_delete_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let service = CouponService::new(state.db.clone());
    service.delete_coupon(&code).await?;
    Ok(Json(MessageResponse::new("Coupon removed")))
}
