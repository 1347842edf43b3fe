pub mod admin;
pub mod auth;
pub mod catalog;
pub mod coupon;
pub mod event;
pub mod order;
pub mod shipping;
pub mod valentine_card;

pub use admin::admin_config;
pub use auth::auth_config;
pub use catalog::catalog_config;
pub use coupon::coupon_config;
pub use event::event_config;
pub use order::order_config;
pub use shipping::shipping_config;
pub use valentine_card::valentine_card_config;
