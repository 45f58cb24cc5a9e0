//! Google/Facebook sign-in handlers

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::oauth::Provider;
use crate::services::{OAuthService, UserService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn parse_provider(name: &str) -> AppResult<Provider> {
    match name {
        "google" => Ok(Provider::Google),
        "facebook" => Ok(Provider::Facebook),
        _ => Err(AppError::NotFound("Sign-in provider".to_string())),
    }
}

fn oauth_service(state: &AppState) -> OAuthService {
    OAuthService::new(
        UserService::new(state.db.clone(), &state.config),
        &state.config,
    )
}

/// Send the browser to the provider's consent page
pub async fn oauth_start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> AppResult<Redirect> {
    let provider = parse_provider(&provider)?;
    let url = oauth_service(&state).authorization_url(provider)?;
    Ok(Redirect::to(&url))
}

/// Provider callback; always lands the browser on the SPA login page
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Redirect {
    let service = oauth_service(&state);

    let outcome = match (parse_provider(&provider), query.code.as_deref()) {
        (Ok(provider), Some(code)) if query.error.is_none() => {
            service
                .complete_sign_in(provider, code, query.state.as_deref())
                .await
        }
        (Err(e), _) => Err(e),
        _ => Err(AppError::Unauthorized(
            query
                .error
                .clone()
                .unwrap_or_else(|| "Missing authorization code".to_string()),
        )),
    };

    match outcome {
        Ok(token) => Redirect::to(&service.login_redirect(Some(&token))),
        Err(e) => {
            tracing::warn!(provider = %provider, error = %e, "Social sign-in failed");
            Redirect::to(&service.login_redirect(None))
        }
    }
}
