pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod phone;

pub use code_generator::{generate_order_number, generate_slug, is_valid_slug};
pub use jwt::*;
pub use password::*;
pub use phone::*;
