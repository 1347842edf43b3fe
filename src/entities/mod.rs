pub mod categories;
pub mod coupons;
pub mod event_images;
pub mod events;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod shipping_methods;
pub mod valentine_card_memories;
pub mod valentine_card_products;
pub mod valentine_cards;

pub use categories as category_entity;
pub use coupons as coupon_entity;
pub use event_images as event_image_entity;
pub use events as event_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use products as product_entity;
pub use shipping_methods as shipping_method_entity;
pub use valentine_card_memories as card_memory_entity;
pub use valentine_card_products as card_product_entity;
pub use valentine_cards as valentine_card_entity;

pub use coupons::CouponType;
pub use orders::OrderStatus;
pub use valentine_card_memories::MemoryType;
pub use valentine_cards::CardStatus;
