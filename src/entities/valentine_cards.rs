use chrono::{DateTime, Utc};
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "card_status")]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "draft")]
    Draft,
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardStatus::Active => write!(f, "active"),
            CardStatus::Draft => write!(f, "draft"),
        }
    }
}

/// 情人节卡片实体
/// - slug: 短链接标识 (全局唯一)
/// - name: 后台展示名称，复制时追加 " (Copy)"
/// - disabled_at: NULL 或未来时间表示仍对外可见
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "valentine_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: Option<String>,
    pub recipient_name: Option<String>,
    pub sender_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
    pub theme: Option<String>,
    pub background_color: Option<String>,
    pub music_url: Option<String>,
    pub status: CardStatus,
    pub disabled_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 对外可见: 状态为 active 且未被停用 (disabled_at 为空或在未来)
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.status == CardStatus::Active
            && match self.disabled_at {
                None => true,
                Some(disabled_at) => disabled_at > now,
            }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::valentine_card_memories::Entity")]
    Memories,
    #[sea_orm(has_many = "super::valentine_card_products::Entity")]
    ProductLinks,
}

impl Related<super::valentine_card_memories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memories.def()
    }
}

impl Related<super::valentine_card_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductLinks.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::valentine_card_products::Relation::Product.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::valentine_card_products::Relation::Card.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn card(status: CardStatus, disabled_at: Option<DateTime<Utc>>) -> Model {
        Model {
            id: 1,
            slug: "ab12cd".to_string(),
            name: None,
            recipient_name: None,
            sender_name: None,
            message: None,
            theme: None,
            background_color: None,
            music_url: None,
            status,
            disabled_at,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_visibility() {
        let now = Utc::now();
        assert!(card(CardStatus::Active, None).is_visible_at(now));
        assert!(card(CardStatus::Active, Some(now + Duration::days(1))).is_visible_at(now));
        assert!(!card(CardStatus::Active, Some(now)).is_visible_at(now));
        assert!(!card(CardStatus::Active, Some(now - Duration::days(1))).is_visible_at(now));
        assert!(!card(CardStatus::Draft, None).is_visible_at(now));
    }
}
