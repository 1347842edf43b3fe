use crate::entities::{CardStatus, MemoryType, card_memory_entity, product_entity};
use crate::store::CardAggregate;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::double_option;

#[derive(Debug, Serialize, ToSchema)]
pub struct CardMemoryResponse {
    pub id: i64,
    pub memory_type: MemoryType,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub thumbnail_url: Option<String>,
    pub order_index: i32,
}

impl From<card_memory_entity::Model> for CardMemoryResponse {
    fn from(m: card_memory_entity::Model) -> Self {
        Self {
            id: m.id,
            memory_type: m.memory_type,
            media_url: m.media_url,
            caption: m.caption,
            thumbnail_url: m.thumbnail_url,
            order_index: m.order_index,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CardProductResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub image_url: Option<String>,
}

impl From<product_entity::Model> for CardProductResponse {
    fn from(m: product_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            price: m.price,
            image_url: m.image_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValentineCardResponse {
    pub id: i64,
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
    pub memories: Vec<CardMemoryResponse>,
    pub products: Vec<CardProductResponse>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CardAggregate> for ValentineCardResponse {
    fn from(a: CardAggregate) -> Self {
        let card = a.card;
        Self {
            id: card.id,
            slug: card.slug,
            name: card.name,
            recipient_name: card.recipient_name,
            sender_name: card.sender_name,
            message: card.message,
            theme: card.theme,
            background_color: card.background_color,
            music_url: card.music_url,
            status: card.status,
            disabled_at: card.disabled_at,
            memories: a.memories.into_iter().map(Into::into).collect(),
            products: a.products.into_iter().map(Into::into).collect(),
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

/// 后台列表项 (不含子记录)
#[derive(Debug, Serialize, ToSchema)]
pub struct ValentineCardSummary {
    pub id: i64,
    pub slug: String,
    pub name: Option<String>,
    pub recipient_name: Option<String>,
    pub status: CardStatus,
    pub disabled_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<crate::entities::valentine_card_entity::Model> for ValentineCardSummary {
    fn from(m: crate::entities::valentine_card_entity::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            name: m.name,
            recipient_name: m.recipient_name,
            status: m.status,
            disabled_at: m.disabled_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CardMemoryInput {
    pub memory_type: MemoryType,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub thumbnail_url: Option<String>,
    /// 缺省时按数组顺序
    pub order_index: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValentineCardQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<CardStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateValentineCardRequest {
    /// 缺省时自动生成
    pub slug: Option<String>,
    pub name: Option<String>,
    pub recipient_name: Option<String>,
    pub sender_name: Option<String>,
    pub message: Option<String>,
    pub theme: Option<String>,
    pub background_color: Option<String>,
    pub music_url: Option<String>,
    pub status: Option<CardStatus>,
    pub disabled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub memories: Vec<CardMemoryInput>,
    #[serde(default)]
    pub product_ids: Vec<i64>,
}

/// memories / product_ids 传入时整体替换
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateValentineCardRequest {
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub recipient_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub sender_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub message: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub theme: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub background_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub music_url: Option<Option<String>>,
    pub status: Option<CardStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub disabled_at: Option<Option<DateTime<Utc>>>,
    pub memories: Option<Vec<CardMemoryInput>>,
    pub product_ids: Option<Vec<i64>>,
}
