use crate::entities::shipping_method_entity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::double_option;

#[derive(Debug, Serialize, ToSchema)]
pub struct ShippingMethodResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub fee: Decimal,
    pub estimated_days: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<shipping_method_entity::Model> for ShippingMethodResponse {
    fn from(m: shipping_method_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            fee: m.fee,
            estimated_days: m.estimated_days,
            sort_order: m.sort_order,
            is_active: m.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateShippingMethodRequest {
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub fee: Decimal,
    pub estimated_days: Option<i32>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateShippingMethodRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[schema(value_type = Option<String>)]
    pub fee: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub estimated_days: Option<Option<i32>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
