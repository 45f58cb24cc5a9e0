//! HTTP handlers

pub mod addresses;
pub mod cart;
pub mod coupons;
pub mod health;
pub mod oauth;
pub mod orders;
pub mod products;
pub mod uploads;
pub mod users;

pub use addresses::*;
pub use cart::*;
pub use coupons::*;
pub use health::*;
pub use oauth::*;
pub use orders::*;
pub use products::*;
pub use uploads::*;
pub use users::*;

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// JSON body extractor whose rejections use the API error body
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}

/// Parse a path id; malformed ids are reported like unknown ones
pub fn parse_id(raw: &str, resource: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(resource.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use shared::LoginInput;

    fn json_request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_app_json_extracts_body() {
        let req = json_request(
            Some("application/json"),
            r#"{"email":"jane@example.com","password":"secret1"}"#,
        );
        let AppJson(input) = AppJson::<LoginInput>::from_request(req, &()).await.unwrap();
        assert_eq!(input.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_app_json_rejections_are_api_errors() {
        let req = json_request(Some("application/json"), r#"{"email": "#);
        let err = AppJson::<LoginInput>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let req = json_request(Some("application/json"), r#"{"email": 5}"#);
        let err = AppJson::<LoginInput>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let req = json_request(None, r#"{}"#);
        let err = AppJson::<LoginInput>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Order").unwrap(), id);
        assert!(matches!(
            parse_id("not-a-uuid", "Order"),
            Err(AppError::NotFound(r)) if r == "Order"
        ));
    }
}
