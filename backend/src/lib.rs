//! Storefront API
//!
//! REST backend for a small e-commerce storefront: catalogue, reviews,
//! carts, orders, coupons, addresses, uploads and social sign-in.

use std::sync::Arc;

use axum::{
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderName, HeaderValue},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod seed;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use crate::middleware::{rate_limit_middleware, security_headers_middleware, ClientRateLimiter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: ClientRateLimiter,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let rate_limiter = ClientRateLimiter::new(&config.rate_limit);
        Self {
            db,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Uploaded images are embedded by the SPA from another origin
    let uploads = Router::new()
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes(&state))
        .merge(uploads)
        .layer(axum_middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
