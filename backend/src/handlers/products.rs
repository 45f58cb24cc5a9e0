//! Catalogue handlers (public browsing, reviews, admin maintenance)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::{parse_id, AppJson};
use crate::middleware::CurrentUser;
use crate::services::product::ProductFilter;
use crate::services::ProductService;
use crate::AppState;
use shared::models::{
    CreateReviewInput, Product, ProductDetail, ProductInput, ProductPage, ProductSuggestion,
};
use shared::types::{MessageResponse, Pagination};

/// Raw catalogue query; values are parsed leniently
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    pub keyword: Option<String>,
}

/// Filtered, sorted, paginated catalogue
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ProductPage>> {
    let filter = ProductFilter::from_query(
        query.keyword.as_deref(),
        query.category.as_deref(),
        query.min_price.as_deref(),
        query.max_price.as_deref(),
        query.min_rating.as_deref(),
        query.sort.as_deref(),
    );
    let pagination = Pagination::from_query(query.page.as_deref(), query.page_size.as_deref());

    let service = ProductService::new(state.db.clone());
    Ok(Json(service.list_products(&filter, pagination).await?))
}

/// Search-as-you-type suggestions
pub async fn product_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> AppResult<Json<Vec<ProductSuggestion>>> {
    let service = ProductService::new(state.db.clone());
    let keyword = query.keyword.unwrap_or_default();
    Ok(Json(service.suggestions(&keyword).await?))
}

/// Product detail with reviews
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<ProductDetail>> {
    let product_id = parse_id(&product_id, "Product")?;
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.get_product_detail(product_id).await?))
}

/// Post a review
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<String>,
    AppJson(body): AppJson<CreateReviewInput>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let product_id = parse_id(&product_id, "Product")?;
    body.validate()?;

    let service = ProductService::new(state.db.clone());
    service.create_review(product_id, user.user_id, body).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Review added"))))
}

// ============================================================================
// Admin
// ============================================================================

/// Every product, newest first
pub async fn admin_list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.list_all().await?))
}

/// Create a product (sample values fill the gaps)
pub async fn admin_create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Option<AppJson<ProductInput>>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let input = body.map(|AppJson(b)| b).unwrap_or_default();
    let service = ProductService::new(state.db.clone());
    let product = service.create_product(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Edit a product
pub async fn admin_update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    AppJson(body): AppJson<ProductInput>,
) -> AppResult<Json<Product>> {
    let product_id = parse_id(&product_id, "Product")?;
    let service = ProductService::new(state.db.clone());
    Ok(Json(service.update_product(product_id, body).await?))
}

/// Delete a product
pub async fn admin_delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let product_id = parse_id(&product_id, "Product")?;
    let service = ProductService::new(state.db.clone());
    service.delete_product(product_id).await?;
    Ok(Json(MessageResponse::new("Product removed")))
}
