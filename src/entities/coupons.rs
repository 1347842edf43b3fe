use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "coupon_type")]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    /// 按百分比折扣
    #[sea_orm(string_value = "percent")]
    Percent,
    /// 固定金额减免
    #[sea_orm(string_value = "flat")]
    Flat,
}

impl std::fmt::Display for CouponType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CouponType::Percent => write!(f, "percent"),
            CouponType::Flat => write!(f, "flat"),
        }
    }
}

/// 优惠券实体
/// - code: 唯一，统一大写存储
/// - discount: percent 时为百分比，flat 时为金额
/// - max_discount: 仅对 percent 生效的封顶金额
/// - usage_limit: NULL = 不限次数
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount: Decimal,
    pub discount_type: CouponType,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub min_spend: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub expire_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 使用次数是否已达上限
    pub fn is_exhausted(&self) -> bool {
        match self.usage_limit {
            None => false,
            Some(limit) => self.used_count >= limit,
        }
    }

    /// 严格小于 now 才算过期，expire_at == now 仍可用
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expire_at, Some(expire_at) if expire_at < now)
    }

    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now) && !self.is_exhausted()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
