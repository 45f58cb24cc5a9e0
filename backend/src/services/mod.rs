//! Business logic services for the storefront

pub mod address;
pub mod cart;
pub mod coupon;
pub mod dashboard;
pub mod oauth;
pub mod order;
pub mod product;
pub mod upload;
pub mod user;

pub use address::AddressService;
pub use cart::CartService;
pub use coupon::CouponService;
pub use dashboard::DashboardService;
pub use oauth::OAuthService;
pub use order::OrderService;
pub use product::ProductService;
pub use upload::UploadService;
pub use user::UserService;
