use crate::entities::{CouponType, coupon_entity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::double_option;

/// 结算页校验优惠码
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckCouponRequest {
    #[serde(default)]
    pub code: String,
    #[schema(value_type = String, example = "1200")]
    pub subtotal: Decimal,
}

/// 优惠码校验结果 (只读，不占用次数)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CouponEvaluation {
    pub coupon_id: i64,
    /// 数据库中存储的原始 code
    pub code: String,
    #[schema(value_type = String)]
    pub discount_amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponResponse {
    pub id: i64,
    pub code: String,
    #[schema(value_type = String)]
    pub discount: Decimal,
    pub discount_type: CouponType,
    #[schema(value_type = Option<String>)]
    pub min_spend: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub expire_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<coupon_entity::Model> for CouponResponse {
    fn from(m: coupon_entity::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            discount: m.discount,
            discount_type: m.discount_type,
            min_spend: m.min_spend,
            max_discount: m.max_discount,
            usage_limit: m.usage_limit,
            used_count: m.used_count,
            is_active: m.is_active,
            expire_at: m.expire_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CouponQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub is_active: Option<bool>,
    /// 按 code 模糊搜索
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCouponRequest {
    pub code: String,
    #[schema(value_type = String)]
    pub discount: Decimal,
    pub discount_type: CouponType,
    #[schema(value_type = Option<String>)]
    pub min_spend: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub is_active: Option<bool>,
    pub expire_at: Option<DateTime<Utc>>,
}

/// 部分更新；可空字段传 null 表示清空
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCouponRequest {
    pub code: Option<String>,
    #[schema(value_type = Option<String>)]
    pub discount: Option<Decimal>,
    pub discount_type: Option<CouponType>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub min_spend: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub max_discount: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub usage_limit: Option<Option<i32>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expire_at: Option<Option<DateTime<Utc>>>,
}
