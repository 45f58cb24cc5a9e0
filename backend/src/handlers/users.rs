//! Account handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::AppJson;
use crate::middleware::CurrentUser;
use crate::services::UserService;
use crate::AppState;
use shared::models::{LoginInput, RegisterInput, UpdateProfileInput, UserProfile, UserWithToken};

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterInput>,
) -> AppResult<(StatusCode, Json<UserWithToken>)> {
    body.validate()?;

    let service = UserService::new(state.db.clone(), &state.config);
    let user = service.register(body).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginInput>,
) -> AppResult<Json<UserWithToken>> {
    let service = UserService::new(state.db.clone(), &state.config);
    Ok(Json(service.login(body).await?))
}

/// Current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let service = UserService::new(state.db.clone(), &state.config);
    Ok(Json(service.get_profile(user.user_id).await?))
}

/// Update the current user's profile; responds with a fresh token
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<UpdateProfileInput>,
) -> AppResult<Json<UserWithToken>> {
    let service = UserService::new(state.db.clone(), &state.config);
    Ok(Json(service.update_profile(user.user_id, body).await?))
}
