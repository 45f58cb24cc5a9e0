//! Address book handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::{parse_id, AppJson};
use crate::middleware::CurrentUser;
use crate::services::AddressService;
use crate::AppState;
use shared::models::{Address, CreateAddressInput, UpdateAddressInput};
use shared::types::MessageResponse;

pub async fn list_addresses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Address>>> {
    let service = AddressService::new(state.db.clone());
    Ok(Json(service.list_addresses(user.user_id).await?))
}

pub async fn create_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<CreateAddressInput>,
) -> AppResult<(StatusCode, Json<Address>)> {
    body.validate()?;

    let service = AddressService::new(state.db.clone());
    let address = service.create_address(user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn update_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<String>,
    AppJson(body): AppJson<UpdateAddressInput>,
) -> AppResult<Json<Address>> {
    let address_id = parse_id(&address_id, "Address")?;
    let service = AddressService::new(state.db.clone());
    Ok(Json(
        service.update_address(user.user_id, address_id, body).await?,
    ))
}

pub async fn delete_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let address_id = parse_id(&address_id, "Address")?;
    let service = AddressService::new(state.db.clone());
    service.delete_address(user.user_id, address_id).await?;
    Ok(Json(MessageResponse::new("Address removed")))
}
