//! 持久化存储接口
//!
//! 优惠码校验与卡片复制只依赖这里的 trait，生产环境使用 [`SeaOrmStore`]，
//! 测试使用内存实现。

pub mod sea_orm_store;

#[cfg(test)]
pub mod memory;

pub use sea_orm_store::SeaOrmStore;

use crate::entities::{
    CardStatus, MemoryType, card_memory_entity as memories, coupon_entity as coupons,
    product_entity as products, valentine_card_entity as cards,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;

/// 卡片聚合: 卡片本身 + 回忆列表 (按 order_index) + 关联商品
#[derive(Debug, Clone, PartialEq)]
pub struct CardAggregate {
    pub card: cards::Model,
    pub memories: Vec<memories::Model>,
    pub products: Vec<products::Model>,
}

impl CardAggregate {
    pub fn product_ids(&self) -> Vec<i64> {
        self.products.iter().map(|p| p.id).collect()
    }
}

/// 新建卡片时的根字段 (id / 时间戳由存储层生成)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDraft {
    pub slug: String,
    pub name: Option<String>,
    pub recipient_name: Option<String>,
    pub sender_name: Option<String>,
    pub message: Option<String>,
    pub theme: Option<String>,
    pub background_color: Option<String>,
    pub music_url: Option<String>,
    pub status: CardStatus,
    pub disabled_at: Option<DateTime<Utc>>,
}

impl CardDraft {
    /// 以现有卡片为模板生成副本字段，name 追加 " (Copy)"
    pub fn copy_of(card: &cards::Model, slug: String) -> Self {
        Self {
            slug,
            name: card.name.as_ref().map(|name| format!("{name} (Copy)")),
            recipient_name: card.recipient_name.clone(),
            sender_name: card.sender_name.clone(),
            message: card.message.clone(),
            theme: card.theme.clone(),
            background_color: card.background_color.clone(),
            music_url: card.music_url.clone(),
            status: card.status,
            disabled_at: card.disabled_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDraft {
    pub memory_type: MemoryType,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub thumbnail_url: Option<String>,
    pub order_index: i32,
}

impl From<&memories::Model> for MemoryDraft {
    fn from(m: &memories::Model) -> Self {
        Self {
            memory_type: m.memory_type,
            media_url: m.media_url.clone(),
            caption: m.caption.clone(),
            thumbnail_url: m.thumbnail_url.clone(),
            order_index: m.order_index,
        }
    }
}

/// 一次性原子写入的卡片聚合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAggregateDraft {
    pub card: CardDraft,
    pub memories: Vec<MemoryDraft>,
    pub product_ids: Vec<i64>,
}

#[derive(Error, Debug)]
pub enum CreateCardError {
    /// 写入时 slug 唯一约束冲突 (并发下预检查之后被占用)
    #[error("slug already taken")]
    SlugTaken,

    #[error(transparent)]
    Db(#[from] DbErr),
}

#[async_trait]
pub trait CouponStore: Send + Sync {
    /// 按 code 精确查找 (调用方负责大写化)
    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<coupons::Model>, DbErr>;
}

#[async_trait]
pub trait CardStore: Send + Sync {
    async fn find_card_aggregate(&self, id: i64) -> Result<Option<CardAggregate>, DbErr>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr>;

    /// 在同一事务内写入卡片、回忆与商品关联；失败时不留下任何记录
    async fn create_card_aggregate(
        &self,
        draft: &CardAggregateDraft,
    ) -> Result<CardAggregate, CreateCardError>;
}
