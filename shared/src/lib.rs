//! Shared types and models for the storefront
//!
//! This crate contains types shared between the backend, the browser (via WASM),
//! and other components of the system.

pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use models::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;
