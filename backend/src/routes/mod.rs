//! Route definitions for the storefront API

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{admin_middleware, auth_middleware},
    AppState,
};

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create API routes (mounted under `/api`)
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Accounts and social sign-in
        .nest("/users", user_routes(state))
        // Catalogue (public browsing, protected reviews)
        .nest("/products", product_routes(state))
        // Protected routes - orders
        .nest("/orders", order_routes(state))
        // Protected routes - server-side cart
        .nest("/cart", cart_routes(state))
        // Protected routes - address book
        .nest("/addresses", address_routes(state))
        // Public coupon lookup
        .route("/coupons/:code", get(handlers::get_coupon))
        // Admin routes
        .nest("/admin", admin_routes(state))
        // Image uploads (admin) and avatars (any signed-in user)
        .nest("/uploads", upload_routes(state, true))
        .nest("/avatar", upload_routes(state, false))
}

/// Account routes
fn user_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        // Google/Facebook OAuth (public endpoints)
        .route("/auth/:provider", get(handlers::oauth_start))
        .route("/auth/:provider/callback", get(handlers::oauth_callback))
        .merge(protected)
}

/// Catalogue routes
fn product_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/:id/reviews", post(handlers::create_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(handlers::list_products))
        .route("/suggestions", get(handlers::product_suggestions))
        .route("/:id", get(handlers::get_product))
        .merge(protected)
}

/// Order routes (protected)
fn order_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_order))
        .route("/myorders", get(handlers::my_orders))
        .route("/:id", get(handlers::get_order))
        .route("/:id/pay", put(handlers::pay_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Cart routes (protected)
fn cart_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_cart)
                .post(handlers::update_cart)
                .delete(handlers::clear_cart),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Address book routes (protected)
fn address_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_addresses).post(handlers::create_address),
        )
        .route(
            "/:id",
            put(handlers::update_address).delete(handlers::delete_address),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Admin routes (protected + admin only)
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::admin_list_products).post(handlers::admin_create_product),
        )
        .route(
            "/products/:id",
            put(handlers::admin_update_product).delete(handlers::admin_delete_product),
        )
        .route("/orders", get(handlers::admin_list_orders))
        .route("/orders/:id/deliver", put(handlers::admin_deliver_order))
        .route("/dashboard", get(handlers::admin_dashboard))
        .route(
            "/coupons",
            get(handlers::admin_list_coupons).post(handlers::admin_create_coupon),
        )
        .route(
            "/coupons/:code",
            delete(handlers::admin_delete_coupon),
        )
        // Layers run bottom-up: authenticate first, then check the admin flag
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Upload routes; `admin_only` gates the catalogue image endpoint
fn upload_routes(state: &AppState, admin_only: bool) -> Router<AppState> {
    let body_limit = state.config.uploads.max_file_size + MULTIPART_OVERHEAD;

    let router = Router::new()
        .route("/", post(handlers::upload_image))
        .layer(DefaultBodyLimit::max(body_limit));

    let router = if admin_only {
        router.route_layer(middleware::from_fn(admin_middleware))
    } else {
        router
    };

    router.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}
