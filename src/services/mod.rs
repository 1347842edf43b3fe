pub mod auth_service;
pub mod card_cloner;
pub mod catalog_service;
pub mod coupon_service;
pub mod event_service;
pub mod order_service;
pub mod shipping_service;
pub mod valentine_card_service;

pub use auth_service::*;
pub use card_cloner::*;
pub use catalog_service::*;
pub use coupon_service::*;
pub use event_service::*;
pub use order_service::*;
pub use shipping_service::*;
pub use valentine_card_service::*;
