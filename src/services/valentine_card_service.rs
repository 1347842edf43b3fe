use super::card_cloner::CardCloner;
use crate::entities::{
    CardStatus, MemoryType, card_memory_entity as memories, card_product_entity as card_products,
    product_entity as products, valentine_card_entity as cards,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::store::sea_orm_store::{
    insert_card_children, is_unique_violation, load_card_aggregate,
};
use crate::store::{CardAggregateDraft, CardDraft, CardStore, CreateCardError, MemoryDraft};
use crate::utils::is_valid_slug;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashSet;
use std::sync::Arc;

/// 校验并转换回忆输入；order_index 缺省时取数组下标
pub fn build_memory_drafts(inputs: &[CardMemoryInput]) -> AppResult<Vec<MemoryDraft>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let media_url = normalize_optional_text(input.media_url.clone());
            let caption = normalize_optional_text(input.caption.clone());
            match input.memory_type {
                MemoryType::Text if caption.is_none() => {
                    return Err(AppError::ValidationError(format!(
                        "Memory #{index}: text memory requires a caption"
                    )));
                }
                MemoryType::Image | MemoryType::Video if media_url.is_none() => {
                    return Err(AppError::ValidationError(format!(
                        "Memory #{index}: {} memory requires a media_url",
                        input.memory_type
                    )));
                }
                _ => {}
            }
            Ok(MemoryDraft {
                memory_type: input.memory_type,
                media_url,
                caption,
                thumbnail_url: normalize_optional_text(input.thumbnail_url.clone()),
                order_index: input.order_index.unwrap_or(index as i32),
            })
        })
        .collect()
}

/// 去重并保持原顺序
pub fn dedup_product_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn validate_slug(slug: &str) -> AppResult<()> {
    if !is_valid_slug(slug) || slug.len() > 64 {
        return Err(AppError::ValidationError(
            "Slug may only contain lowercase letters, digits and '-'".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ValentineCardService {
    pool: DatabaseConnection,
    store: Arc<dyn CardStore>,
    cloner: CardCloner,
}

impl ValentineCardService {
    pub fn new(pool: DatabaseConnection, store: Arc<dyn CardStore>, cloner: CardCloner) -> Self {
        Self {
            pool,
            store,
            cloner,
        }
    }

    /// 公开访问: 仅返回当前可见的卡片，其余一律 404
    pub async fn get_public(&self, slug: &str) -> AppResult<ValentineCardResponse> {
        let card = cards::Entity::find()
            .filter(cards::Column::Slug.eq(slug))
            .one(&self.pool)
            .await?
            .filter(|card| card.is_visible_at(Utc::now()))
            .ok_or_else(|| AppError::NotFound("Valentine card not found".to_string()))?;

        Ok(load_card_aggregate(&self.pool, card).await?.into())
    }

    pub async fn list(
        &self,
        query: &ValentineCardQuery,
    ) -> AppResult<PaginatedResponse<ValentineCardSummary>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = cards::Entity::find();
        if let Some(status) = query.status {
            base_query = base_query.filter(cards::Column::Status.eq(status));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let models = base_query
            .order_by_desc(cards::Column::CreatedAt)
            .order_by_desc(cards::Column::Id)
            .limit(params.page_size())
            .offset(params.offset())
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            models.into_iter().map(Into::into).collect(),
            &params,
            total,
        ))
    }

    pub async fn get(&self, id: i64) -> AppResult<ValentineCardResponse> {
        self.store
            .find_card_aggregate(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Valentine card not found".to_string()))
    }

    pub async fn create(
        &self,
        request: CreateValentineCardRequest,
    ) -> AppResult<ValentineCardResponse> {
        let memories = build_memory_drafts(&request.memories)?;
        let product_ids = dedup_product_ids(&request.product_ids);
        self.ensure_products_exist(&product_ids).await?;

        let draft = CardAggregateDraft {
            card: CardDraft {
                slug: String::new(),
                name: normalize_optional_text(request.name),
                recipient_name: normalize_optional_text(request.recipient_name),
                sender_name: normalize_optional_text(request.sender_name),
                message: normalize_optional_text(request.message),
                theme: normalize_optional_text(request.theme),
                background_color: normalize_optional_text(request.background_color),
                music_url: normalize_optional_text(request.music_url),
                status: request.status.unwrap_or(CardStatus::Draft),
                disabled_at: request.disabled_at,
            },
            memories,
            product_ids,
        };

        let created = match normalize_optional_text(request.slug) {
            // 指定 slug 时冲突直接报错，不重试
            Some(slug) => {
                validate_slug(&slug)?;
                if self.store.slug_exists(&slug).await? {
                    return Err(AppError::Conflict(format!("Slug {slug} is already in use")));
                }
                let draft = CardAggregateDraft {
                    card: CardDraft { slug, ..draft.card },
                    ..draft
                };
                match self.store.create_card_aggregate(&draft).await {
                    Ok(created) => created,
                    Err(CreateCardError::SlugTaken) => {
                        return Err(AppError::Conflict(format!(
                            "Slug {} is already in use",
                            draft.card.slug
                        )));
                    }
                    Err(CreateCardError::Db(err)) => return Err(err.into()),
                }
            }
            None => self.cloner.persist_with_unique_slug(draft).await?,
        };

        log::info!(
            "Valentine card {} created (slug {})",
            created.card.id,
            created.card.slug
        );
        Ok(created.into())
    }

    /// 更新卡片；memories / product_ids 在同一事务内整体替换
    pub async fn update(
        &self,
        id: i64,
        request: UpdateValentineCardRequest,
    ) -> AppResult<ValentineCardResponse> {
        let memory_drafts = request
            .memories
            .as_deref()
            .map(build_memory_drafts)
            .transpose()?;
        let product_ids = request.product_ids.as_deref().map(dedup_product_ids);
        if let Some(ids) = &product_ids {
            self.ensure_products_exist(ids).await?;
        }

        let txn = self.pool.begin().await?;
        let current = cards::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Valentine card not found".to_string()))?;

        let mut am = current.into_active_model();
        if let Some(slug) = request.slug {
            let slug = slug.trim().to_string();
            validate_slug(&slug)?;
            let taken = cards::Entity::find()
                .filter(cards::Column::Slug.eq(slug.as_str()))
                .filter(cards::Column::Id.ne(id))
                .count(&txn)
                .await?;
            if taken > 0 {
                return Err(AppError::Conflict(format!("Slug {slug} is already in use")));
            }
            am.slug = Set(slug);
        }
        if let Some(name) = request.name {
            am.name = Set(normalize_optional_text(name));
        }
        if let Some(recipient_name) = request.recipient_name {
            am.recipient_name = Set(normalize_optional_text(recipient_name));
        }
        if let Some(sender_name) = request.sender_name {
            am.sender_name = Set(normalize_optional_text(sender_name));
        }
        if let Some(message) = request.message {
            am.message = Set(normalize_optional_text(message));
        }
        if let Some(theme) = request.theme {
            am.theme = Set(normalize_optional_text(theme));
        }
        if let Some(background_color) = request.background_color {
            am.background_color = Set(normalize_optional_text(background_color));
        }
        if let Some(music_url) = request.music_url {
            am.music_url = Set(normalize_optional_text(music_url));
        }
        if let Some(status) = request.status {
            am.status = Set(status);
        }
        if let Some(disabled_at) = request.disabled_at {
            am.disabled_at = Set(disabled_at);
        }
        let now = Utc::now();
        am.updated_at = Set(Some(now));

        let card = am.update(&txn).await.map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Conflict("Slug is already in use".to_string())
            } else {
                err.into()
            }
        })?;

        if let Some(drafts) = &memory_drafts {
            memories::Entity::delete_many()
                .filter(memories::Column::CardId.eq(id))
                .exec(&txn)
                .await?;
            insert_card_children(&txn, id, drafts, &[], now).await?;
        }
        if let Some(ids) = &product_ids {
            card_products::Entity::delete_many()
                .filter(card_products::Column::CardId.eq(id))
                .exec(&txn)
                .await?;
            insert_card_children(&txn, id, &[], ids, now).await?;
        }

        let aggregate = load_card_aggregate(&txn, card).await?;
        txn.commit().await?;
        Ok(aggregate.into())
    }

    /// 回忆与商品关联随外键级联删除
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = cards::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Valentine card not found".to_string()));
        }
        log::info!("Valentine card {id} deleted");
        Ok(())
    }

    pub async fn duplicate(&self, id: i64) -> AppResult<ValentineCardResponse> {
        Ok(self.cloner.clone_card(id).await?.into())
    }

    async fn ensure_products_exist(&self, ids: &[i64]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = products::Entity::find()
            .filter(products::Column::Id.is_in(ids.iter().copied()))
            .count(&self.pool)
            .await?;
        if found != ids.len() as u64 {
            return Err(AppError::ValidationError(
                "One or more products do not exist".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(memory_type: MemoryType, media_url: Option<&str>, caption: Option<&str>) -> CardMemoryInput {
        CardMemoryInput {
            memory_type,
            media_url: media_url.map(str::to_string),
            caption: caption.map(str::to_string),
            thumbnail_url: None,
            order_index: None,
        }
    }

    #[test]
    fn test_memory_order_defaults_to_position() {
        let mut explicit = input(MemoryType::Text, None, Some("hello"));
        explicit.order_index = Some(10);
        let drafts = build_memory_drafts(&[
            input(MemoryType::Image, Some("https://cdn.example.com/a.jpg"), None),
            explicit,
            input(MemoryType::Video, Some("https://cdn.example.com/b.mp4"), Some("  ")),
        ])
        .unwrap();

        let order: Vec<i32> = drafts.iter().map(|d| d.order_index).collect();
        assert_eq!(order, vec![0, 10, 2]);
        assert_eq!(drafts[2].caption, None);
    }

    #[test]
    fn test_memory_content_is_required() {
        assert!(build_memory_drafts(&[input(MemoryType::Text, None, None)]).is_err());
        assert!(build_memory_drafts(&[input(MemoryType::Image, Some(" "), None)]).is_err());
        assert!(build_memory_drafts(&[input(MemoryType::Video, None, Some("clip"))]).is_err());
    }

    #[test]
    fn test_dedup_product_ids_keeps_order() {
        assert_eq!(dedup_product_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_product_ids(&[]).is_empty());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("ab12cd").is_ok());
        assert!(validate_slug("for-mint").is_ok());
        assert!(validate_slug("AB12CD").is_err());
        assert!(validate_slug("").is_err());
    }
}
