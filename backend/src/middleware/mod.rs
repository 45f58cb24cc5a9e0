//! HTTP middleware

pub mod auth;
pub mod rate_limit;
pub mod security_headers;

pub use auth::{admin_middleware, auth_middleware, AuthUser, CurrentUser};
pub use rate_limit::{rate_limit_middleware, ClientRateLimiter};
pub use security_headers::security_headers_middleware;
