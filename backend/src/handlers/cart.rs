//! Cart handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::handlers::AppJson;
use crate::middleware::CurrentUser;
use crate::services::CartService;
use crate::AppState;
use shared::models::{Cart, UpdateCartInput};
use shared::types::MessageResponse;

fn created_or_ok(created: bool) -> StatusCode {
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

/// Current cart, created on first access
pub async fn get_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<(StatusCode, Json<Cart>)> {
    let service = CartService::new(state.db.clone());
    let (cart, created) = service.get_cart(user.user_id).await?;
    Ok((created_or_ok(created), Json(cart)))
}

/// Replace the cart's lines
pub async fn update_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<UpdateCartInput>,
) -> AppResult<(StatusCode, Json<Cart>)> {
    let service = CartService::new(state.db.clone());
    let (cart, created) = service.replace_cart(user.user_id, body.cart_items).await?;
    Ok((created_or_ok(created), Json(cart)))
}

/// Empty the cart
pub async fn clear_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    let service = CartService::new(state.db.clone());
    service.clear_cart(user.user_id).await?;
    Ok(Json(MessageResponse::new("Cart cleared")))
}
