//! Domain models for the storefront

mod address;
mod cart;
mod coupon;
mod order;
mod product;
mod user;

pub use address::*;
pub use cart::*;
pub use coupon::*;
pub use order::*;
pub use product::*;
pub use user::*;
