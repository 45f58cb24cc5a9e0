//! Configuration management for the storefront API
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOREFRONT__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Google/Facebook sign-in configuration
    pub oauth: OAuthConfig,

    /// Image upload configuration
    pub uploads: UploadConfig,

    /// Per-IP request limits
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Token lifetime in seconds
    pub token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub facebook_app_id: Option<String>,
    pub facebook_app_secret: Option<String>,

    /// Public base URL of this API, used to build provider callback URLs
    pub callback_base_url: String,

    /// SPA origin that receives the `?token=` redirect
    pub frontend_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Directory uploaded images are written to and served from
    pub dir: String,

    /// Maximum accepted file size in bytes
    pub max_file_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Length of the limiting window in seconds
    pub window_secs: u64,

    /// Requests allowed per client IP per window
    pub max_requests: u32,

    /// Key clients by `X-Forwarded-For`/`X-Real-IP`; only enable behind a proxy
    /// that overwrites those headers
    #[serde(default)]
    pub trust_proxy: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOREFRONT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.token_expiry", 30 * 24 * 3600)?
            .set_default("oauth.callback_base_url", "http://localhost:5000")?
            .set_default("oauth.frontend_url", "http://localhost:3000")?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.max_file_size", 5 * 1024 * 1024)?
            .set_default("rate_limit.window_secs", 300)?
            .set_default("rate_limit.max_requests", 100)?
            .set_default("rate_limit.trust_proxy", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOREFRONT__ prefix)
            .add_source(
                Environment::with_prefix("STOREFRONT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 300,
            max_requests: 100,
            trust_proxy: false,
        }
    }
}

impl Config {
    /// Configuration used by tests that never touch the database
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/storefront_test".to_string(),
                max_connections: 1,
                min_connections: 0,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                token_expiry: 3600,
            },
            oauth: OAuthConfig {
                google_client_id: None,
                google_client_secret: None,
                facebook_app_id: None,
                facebook_app_secret: None,
                callback_base_url: "http://localhost:5000".to_string(),
                frontend_url: "http://localhost:3000".to_string(),
            },
            uploads: UploadConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
