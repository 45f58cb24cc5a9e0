//! Router-level tests for behavior that needs no database
//!
//! Covers:
//! - Bearer token rejection and admin gating
//! - Security headers and rate limiting
//! - Request body rejections and input validation
//! - Image upload checks
//! - Social sign-in redirects

use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use storefront_backend::{create_app, middleware::auth::create_token, AppState, Config};
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Helpers
// ============================================================================

fn app_with(config: Config) -> Router {
    // Never connected: every request below is answered before a handler runs a query
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    create_app(AppState::new(db, config))
}

fn app() -> Router {
    app_with(Config::for_tests())
}

fn token(is_admin: bool) -> String {
    let config = Config::for_tests();
    create_token(Uuid::new_v4(), is_admin, &config.jwt.secret, 3600).unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, bearer: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

const BOUNDARY: &str = "storefront-test-boundary";

/// Single-part multipart upload to `/api/uploads` as an admin
fn upload(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
        b = BOUNDARY,
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(true)))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_route_requires_token() {
    let response = app().oneshot(get("/api/orders/myorders", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Not authorized, no token");
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let forged = create_token(Uuid::new_v4(), true, "not-the-secret", 3600).unwrap();
    let response = app()
        .oneshot(get("/api/cart", Some(&forged)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let config = Config::for_tests();
    let expired = create_token(Uuid::new_v4(), false, &config.jwt.secret, -3600).unwrap();
    let response = app()
        .oneshot(get("/api/users/profile", Some(&expired)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let customer = token(false);

    for uri in [
        "/api/admin/dashboard",
        "/api/admin/orders",
        "/api/admin/products",
        "/api/admin/coupons",
    ] {
        let response = app().oneshot(get(uri, Some(&customer))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Not authorized as an admin");
    }
}

#[tokio::test]
async fn test_admin_routes_require_token_before_role() {
    let response = app().oneshot(get("/api/admin/dashboard", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalogue_upload_is_admin_only() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(false)))
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
        .body(Body::from("--x--\r\n"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_banner_and_security_headers() {
    let response = app().oneshot(get("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert!(headers.contains_key("strict-transport-security"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Storefront API is running...");
}

#[tokio::test]
async fn test_error_responses_carry_security_headers() {
    let response = app().oneshot(get("/api/cart", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

fn from_peer(peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let mut config = Config::for_tests();
    config.rate_limit.max_requests = 2;
    let app = app_with(config);

    for _ in 0..2 {
        let response = app.clone().oneshot(from_peer("203.0.113.7:4000", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(from_peer("203.0.113.7:4001", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert_eq!(body["code"], "RATE_LIMITED");

    let response = app.oneshot(from_peer("198.51.100.2:4000", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_spoofed_forwarded_for_does_not_reset_quota() {
    let mut config = Config::for_tests();
    config.rate_limit.max_requests = 2;
    let app = app_with(config);

    for spoofed in ["10.1.1.1", "10.2.2.2"] {
        let response = app
            .clone()
            .oneshot(from_peer("203.0.113.7:4000", Some(spoofed)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(from_peer("203.0.113.7:4000", Some("10.3.3.3")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_for_keys_clients_behind_trusted_proxy() {
    let mut config = Config::for_tests();
    config.rate_limit.max_requests = 2;
    config.rate_limit.trust_proxy = true;
    let app = app_with(config);

    // Every request arrives from the proxy's address
    let proxy = "10.0.0.1:443";
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(from_peer(proxy, Some("203.0.113.7")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(from_peer(proxy, Some("203.0.113.7")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app
        .oneshot(from_peer(proxy, Some("198.51.100.2")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Request bodies
// ============================================================================

#[tokio::test]
async fn test_malformed_json_gets_error_body() {
    let response = app()
        .oneshot(post_json("/api/users/login", None, r#"{"email": "#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_wrong_field_type_gets_error_body() {
    let response = app()
        .oneshot(post_json(
            "/api/users/register",
            None,
            r#"{"name": 7, "email": "jane@example.com", "password": "secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_missing_json_content_type_is_unsupported() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/login")
        .body(Body::from(r#"{"email":"a@b.co","password":"x"}"#))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn test_register_rejects_blank_name() {
    let response = app()
        .oneshot(post_json(
            "/api/users/register",
            None,
            r#"{"name": "   ", "email": "jane@example.com", "password": "secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Name is required");
    assert_eq!(body["field"], "name");
}

#[tokio::test]
async fn test_review_rejects_blank_comment() {
    let uri = format!("/api/products/{}/reviews", Uuid::new_v4());
    let response = app()
        .oneshot(post_json(
            &uri,
            Some(&token(false)),
            r#"{"rating": 5, "comment": "  \n "}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Comment is required");
}

// ============================================================================
// Uploads
// ============================================================================

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let response = app()
        .oneshot(upload("image", "anim.gif", "image/gif", b"GIF89a"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Images only!");
}

#[tokio::test]
async fn test_upload_requires_image_field() {
    let response = app()
        .oneshot(upload("photo", "pic.png", "image/png", b"\x89PNG"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_rejects_oversized_files() {
    let mut config = Config::for_tests();
    config.uploads.max_file_size = 1024;

    // Over the configured size but inside the request body limit
    let response = app_with(config.clone())
        .oneshot(upload("image", "big.png", "image/png", &vec![0u8; 4 * 1024]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["message"], "File is too large");

    // Over the request body limit itself
    let response = app_with(config)
        .oneshot(upload("image", "huge.png", "image/png", &vec![0u8; 200 * 1024]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// ============================================================================
// Social sign-in
// ============================================================================

#[tokio::test]
async fn test_unknown_provider_is_not_found() {
    let response = app()
        .oneshot(get("/api/users/auth/myspace", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_google_start_redirects_to_consent_page() {
    let mut config = Config::for_tests();
    config.oauth.google_client_id = Some("client-id".to_string());
    config.oauth.google_client_secret = Some("client-secret".to_string());

    let response = app_with(config)
        .oneshot(get("/api/users/auth/google", None))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://accounts.google.com/"));
    assert!(location.contains("client_id=client-id"));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn test_failed_callback_lands_on_login_page() {
    let response = app()
        .oneshot(get(
            "/api/users/auth/facebook/callback?error=access_denied",
            None,
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://localhost:3000/login"
    );
}
