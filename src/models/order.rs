use crate::entities::{OrderStatus, order_entity, order_item_entity};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CartItemRequest {
    pub product_id: i64,
    pub quantity: i32,
}

/// 结算试算：不落库、不占用优惠码
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct QuoteRequest {
    pub items: Vec<CartItemRequest>,
    pub coupon_code: Option<String>,
    pub shipping_method_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuoteLine {
    pub product_id: i64,
    pub product_name: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub lines: Vec<QuoteLine>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    pub coupon_code: Option<String>,
    #[schema(value_type = String)]
    pub discount_amount: Decimal,
    pub shipping_method_id: Option<i64>,
    #[schema(value_type = String)]
    pub shipping_fee: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartItemRequest>,
    pub coupon_code: Option<String>,
    pub shipping_method_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub delivery_date: Option<NaiveDate>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Option<i64>,
    pub product_name: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub line_total: Decimal,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(m: order_item_entity::Model) -> Self {
        Self {
            product_id: m.product_id,
            product_name: m.product_name,
            unit_price: m.unit_price,
            quantity: m.quantity,
            line_total: m.line_total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub delivery_date: Option<NaiveDate>,
    pub note: Option<String>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub discount_amount: Decimal,
    #[schema(value_type = String)]
    pub shipping_fee: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub coupon_code: Option<String>,
    pub shipping_method_id: Option<i64>,
    pub status: OrderStatus,
    pub items: Vec<OrderItemResponse>,
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderResponse {
    pub fn from_parts(m: order_entity::Model, items: Vec<order_item_entity::Model>) -> Self {
        Self {
            id: m.id,
            order_number: m.order_number,
            customer_name: m.customer_name,
            customer_phone: m.customer_phone,
            customer_email: m.customer_email,
            shipping_address: m.shipping_address,
            delivery_date: m.delivery_date,
            note: m.note,
            subtotal: m.subtotal,
            discount_amount: m.discount_amount,
            shipping_fee: m.shipping_fee,
            total: m.total,
            coupon_code: m.coupon_code,
            shipping_method_id: m.shipping_method_id,
            status: m.status,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}
