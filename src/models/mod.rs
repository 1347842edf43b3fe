pub mod auth;
pub mod catalog;
pub mod common;
pub mod coupon;
pub mod event;
pub mod order;
pub mod pagination;
pub mod shipping;
pub mod valentine_card;

pub use auth::*;
pub use catalog::*;
pub use common::*;
pub use coupon::*;
pub use event::*;
pub use order::*;
pub use pagination::*;
pub use shipping::*;
pub use valentine_card::*;
