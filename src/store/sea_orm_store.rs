use super::{
    CardAggregate, CardAggregateDraft, CardDraft, CardStore, CouponStore, CreateCardError,
    MemoryDraft,
};
use crate::entities::{
    card_memory_entity as memories, card_product_entity as card_products,
    coupon_entity as coupons, product_entity as products, valentine_card_entity as cards,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};

#[derive(Clone)]
pub struct SeaOrmStore {
    pool: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

/// 读取卡片的回忆与关联商品
pub async fn load_card_aggregate<C: ConnectionTrait>(
    conn: &C,
    card: cards::Model,
) -> Result<CardAggregate, DbErr> {
    let memories = card
        .find_related(memories::Entity)
        .order_by_asc(memories::Column::OrderIndex)
        .order_by_asc(memories::Column::Id)
        .all(conn)
        .await?;
    let products = card
        .find_related(products::Entity)
        .order_by_asc(products::Column::Id)
        .all(conn)
        .await?;
    Ok(CardAggregate {
        card,
        memories,
        products,
    })
}

/// 写入回忆与商品关联 (调用方提供事务)
pub async fn insert_card_children<C: ConnectionTrait>(
    conn: &C,
    card_id: i64,
    memory_drafts: &[MemoryDraft],
    product_ids: &[i64],
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    if !memory_drafts.is_empty() {
        let rows = memory_drafts.iter().map(|m| memories::ActiveModel {
            card_id: Set(card_id),
            memory_type: Set(m.memory_type),
            media_url: Set(m.media_url.clone()),
            caption: Set(m.caption.clone()),
            thumbnail_url: Set(m.thumbnail_url.clone()),
            order_index: Set(m.order_index),
            created_at: Set(Some(now)),
            ..Default::default()
        });
        memories::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await?;
    }

    if !product_ids.is_empty() {
        let rows = product_ids.iter().map(|product_id| card_products::ActiveModel {
            card_id: Set(card_id),
            product_id: Set(*product_id),
        });
        card_products::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

pub fn card_active_model(draft: &CardDraft, now: DateTime<Utc>) -> cards::ActiveModel {
    cards::ActiveModel {
        slug: Set(draft.slug.clone()),
        name: Set(draft.name.clone()),
        recipient_name: Set(draft.recipient_name.clone()),
        sender_name: Set(draft.sender_name.clone()),
        message: Set(draft.message.clone()),
        theme: Set(draft.theme.clone()),
        background_color: Set(draft.background_color.clone()),
        music_url: Set(draft.music_url.clone()),
        status: Set(draft.status),
        disabled_at: Set(draft.disabled_at),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl CouponStore for SeaOrmStore {
    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<coupons::Model>, DbErr> {
        coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code))
            .one(&self.pool)
            .await
    }
}

#[async_trait]
impl CardStore for SeaOrmStore {
    async fn find_card_aggregate(&self, id: i64) -> Result<Option<CardAggregate>, DbErr> {
        match cards::Entity::find_by_id(id).one(&self.pool).await? {
            Some(card) => Ok(Some(load_card_aggregate(&self.pool, card).await?)),
            None => Ok(None),
        }
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = cards::Entity::find()
            .filter(cards::Column::Slug.eq(slug))
            .count(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn create_card_aggregate(
        &self,
        draft: &CardAggregateDraft,
    ) -> Result<CardAggregate, CreateCardError> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let card = match card_active_model(&draft.card, now).insert(&txn).await {
            Ok(card) => card,
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                return Err(CreateCardError::SlugTaken);
            }
            Err(err) => {
                txn.rollback().await?;
                return Err(err.into());
            }
        };

        // 子记录失败时整体回滚，不会留下只有根记录的卡片
        if let Err(err) =
            insert_card_children(&txn, card.id, &draft.memories, &draft.product_ids, now).await
        {
            txn.rollback().await?;
            return Err(err.into());
        }

        let aggregate = load_card_aggregate(&txn, card).await?;
        txn.commit().await?;
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CardStatus, MemoryType};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn draft() -> CardAggregateDraft {
        CardAggregateDraft {
            card: CardDraft {
                slug: "ef34gh".to_string(),
                name: Some("Anniversary (Copy)".to_string()),
                recipient_name: None,
                sender_name: None,
                message: None,
                theme: None,
                background_color: None,
                music_url: None,
                status: CardStatus::Active,
                disabled_at: None,
            },
            memories: vec![MemoryDraft {
                memory_type: MemoryType::Image,
                media_url: Some("https://cdn.example.com/a.jpg".to_string()),
                caption: None,
                thumbnail_url: None,
                order_index: 0,
            }],
            product_ids: vec![7],
        }
    }

    fn card_row() -> cards::Model {
        cards::Model {
            id: 42,
            slug: "ef34gh".to_string(),
            name: Some("Anniversary (Copy)".to_string()),
            recipient_name: None,
            sender_name: None,
            message: None,
            theme: None,
            background_color: None,
            music_url: None,
            status: CardStatus::Active,
            disabled_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_card_aggregate_commits_root_and_children() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![card_row()]])
            .append_query_results([Vec::<memories::Model>::new()])
            .append_query_results([Vec::<products::Model>::new()])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let store = SeaOrmStore::new(db);

        let aggregate = store.create_card_aggregate(&draft()).await.unwrap();
        assert_eq!(aggregate.card.id, 42);
        assert_eq!(aggregate.card.slug, "ef34gh");
    }

    #[tokio::test]
    async fn test_create_card_aggregate_child_failure_is_not_slug_taken() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![card_row()]])
            .append_exec_errors([DbErr::Custom("memory insert failed".to_string())])
            .into_connection();
        let store = SeaOrmStore::new(db);

        let err = store.create_card_aggregate(&draft()).await.unwrap_err();
        assert!(matches!(err, CreateCardError::Db(_)));
    }

    #[test]
    fn test_is_unique_violation_ignores_other_errors() {
        assert!(!is_unique_violation(&DbErr::Custom("boom".to_string())));
        assert!(!is_unique_violation(&DbErr::RecordNotFound("card".to_string())));
    }
}
