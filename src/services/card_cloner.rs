//! 卡片复制
//!
//! 复制一张卡片的根字段、全部回忆与商品关联，并为副本分配一个新的唯一 slug。
//! slug 冲突（包括写入时才暴露的并发冲突）按同一个预算重试，用尽后返回
//! [`AppError::SlugSpaceExhausted`]。

use crate::error::{AppError, AppResult};
use crate::store::{
    CardAggregate, CardAggregateDraft, CardDraft, CardStore, CreateCardError, MemoryDraft,
};
use crate::utils::generate_slug;
use std::collections::HashSet;
use std::sync::Arc;

/// slug 候选来源
pub trait SlugSource: Send + Sync {
    fn next_slug(&self) -> String;
}

/// 随机 slug: [a-z0-9]{length}
#[derive(Debug, Clone)]
pub struct RandomSlugs {
    length: usize,
}

impl RandomSlugs {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl SlugSource for RandomSlugs {
    fn next_slug(&self) -> String {
        generate_slug(self.length)
    }
}

#[derive(Clone)]
pub struct CardCloner {
    store: Arc<dyn CardStore>,
    slugs: Arc<dyn SlugSource>,
    max_attempts: u32,
}

impl CardCloner {
    pub fn new(store: Arc<dyn CardStore>, slugs: Arc<dyn SlugSource>, max_attempts: u32) -> Self {
        Self {
            store,
            slugs,
            max_attempts,
        }
    }

    /// 复制卡片，返回新卡片 (含回忆与商品)
    pub async fn clone_card(&self, source_id: i64) -> AppResult<CardAggregate> {
        let source = self
            .store
            .find_card_aggregate(source_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Valentine card not found".to_string()))?;

        // 商品只复制关联关系，不复制商品本身
        let mut seen = HashSet::new();
        let product_ids: Vec<i64> = source
            .product_ids()
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let draft = CardAggregateDraft {
            card: CardDraft::copy_of(&source.card, String::new()),
            memories: source.memories.iter().map(MemoryDraft::from).collect(),
            product_ids,
        };

        let copy = self.persist_with_unique_slug(draft).await?;
        log::info!(
            "Valentine card {} duplicated as {} (slug {})",
            source_id,
            copy.card.id,
            copy.card.slug
        );
        Ok(copy)
    }

    /// 分配唯一 slug 并原子写入；draft.card.slug 会被覆盖
    pub async fn persist_with_unique_slug(
        &self,
        mut draft: CardAggregateDraft,
    ) -> AppResult<CardAggregate> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.slugs.next_slug();
            if self.store.slug_exists(&candidate).await? {
                log::debug!("Slug {candidate} already in use (attempt {attempt})");
                continue;
            }

            draft.card.slug = candidate;
            match self.store.create_card_aggregate(&draft).await {
                Ok(created) => return Ok(created),
                Err(CreateCardError::SlugTaken) => {
                    log::warn!(
                        "Slug {} was taken concurrently (attempt {attempt})",
                        draft.card.slug
                    );
                }
                Err(CreateCardError::Db(err)) => return Err(err.into()),
            }
        }

        Err(AppError::SlugSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CardStatus, MemoryType};
    use crate::store::memory::MemoryStore;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 按顺序返回预设 slug，用完后回退到随机
    struct ScriptedSlugs {
        queue: Mutex<VecDeque<String>>,
    }

    impl ScriptedSlugs {
        fn new(slugs: &[&str]) -> Self {
            Self {
                queue: Mutex::new(slugs.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    impl SlugSource for ScriptedSlugs {
        fn next_slug(&self) -> String {
            self.queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| generate_slug(6))
        }
    }

    fn card_draft(slug: &str, name: Option<&str>) -> CardDraft {
        CardDraft {
            slug: slug.to_string(),
            name: name.map(str::to_string),
            recipient_name: Some("Mint".to_string()),
            sender_name: Some("Ploy".to_string()),
            message: Some("Happy Valentine's".to_string()),
            theme: Some("rose".to_string()),
            background_color: Some("#ffe4e1".to_string()),
            music_url: None,
            status: CardStatus::Active,
            disabled_at: None,
        }
    }

    fn memory(order_index: i32, caption: &str) -> MemoryDraft {
        MemoryDraft {
            memory_type: MemoryType::Image,
            media_url: Some(format!("https://cdn.example.com/{order_index}.jpg")),
            caption: Some(caption.to_string()),
            thumbnail_url: None,
            order_index,
        }
    }

    /// 建一张 slug=ab12cd 的源卡片: 3 条回忆 + 2 个商品
    async fn seed_source(store: &MemoryStore) -> CardAggregate {
        let rose = store.insert_product("Red Rose Bouquet");
        let tulip = store.insert_product("Tulip Box");
        store
            .create_card_aggregate(&CardAggregateDraft {
                card: card_draft("ab12cd", Some("Love")),
                memories: vec![memory(0, "first"), memory(1, "second"), memory(2, "third")],
                product_ids: vec![rose.id, tulip.id],
            })
            .await
            .unwrap()
    }

    fn cloner(store: Arc<MemoryStore>, slugs: &[&str], max_attempts: u32) -> CardCloner {
        CardCloner::new(store, Arc::new(ScriptedSlugs::new(slugs)), max_attempts)
    }

    #[tokio::test]
    async fn test_duplicate_copies_fields_memories_and_products() {
        let store = Arc::new(MemoryStore::new());
        let source = seed_source(&store).await;
        let products_before = store.product_count();

        let copy = cloner(store.clone(), &["ef34gh"], 20)
            .clone_card(source.card.id)
            .await
            .unwrap();

        assert_ne!(copy.card.id, source.card.id);
        assert_eq!(copy.card.slug, "ef34gh");
        assert_eq!(copy.card.name.as_deref(), Some("Love (Copy)"));
        assert_eq!(copy.card.recipient_name, source.card.recipient_name);
        assert_eq!(copy.card.message, source.card.message);
        assert_eq!(copy.card.status, source.card.status);

        let captions: Vec<_> = copy.memories.iter().map(|m| m.caption.clone()).collect();
        let source_captions: Vec<_> = source.memories.iter().map(|m| m.caption.clone()).collect();
        assert_eq!(captions, source_captions);
        assert!(copy.memories.iter().all(|m| m.card_id == copy.card.id));

        assert_eq!(copy.product_ids(), source.product_ids());
        assert_eq!(store.product_count(), products_before);
        assert_eq!(store.card_count(), 2);
        assert_eq!(store.memory_count(), 6);
    }

    #[tokio::test]
    async fn test_missing_name_stays_missing() {
        let store = Arc::new(MemoryStore::new());
        let source = store
            .create_card_aggregate(&CardAggregateDraft {
                card: card_draft("noname", None),
                memories: vec![],
                product_ids: vec![],
            })
            .await
            .unwrap();

        let copy = cloner(store.clone(), &[], 20)
            .clone_card(source.card.id)
            .await
            .unwrap();
        assert_eq!(copy.card.name, None);
        assert!(copy.memories.is_empty());
        assert!(copy.products.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_source_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let err = cloner(store.clone(), &[], 20)
            .clone_card(999)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.card_count(), 0);
    }

    #[tokio::test]
    async fn test_retries_on_existing_slug() {
        let store = Arc::new(MemoryStore::new());
        let source = seed_source(&store).await;

        let copy = cloner(store.clone(), &["ab12cd", "ab12cd", "zz99yy"], 20)
            .clone_card(source.card.id)
            .await
            .unwrap();
        assert_eq!(copy.card.slug, "zz99yy");
        assert_eq!(store.slug_checks(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_slug_claim_is_retried() {
        let store = Arc::new(MemoryStore::new());
        let source = seed_source(&store).await;
        // 预检查通过，但写入时已被别人占用
        store.add_racing_slug("race01");

        let copy = cloner(store.clone(), &["race01", "safe02"], 20)
            .clone_card(source.card.id)
            .await
            .unwrap();
        assert_eq!(copy.card.slug, "safe02");
        assert_eq!(store.card_count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_attempts() {
        let store = Arc::new(MemoryStore::new());
        let source = seed_source(&store).await;

        let err = cloner(store.clone(), &["ab12cd"; 3], 3)
            .clone_card(source.card.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlugSpaceExhausted { attempts: 3 }));
        assert_eq!(store.card_count(), 1);
        assert_eq!(store.slug_checks(), 3);
    }

    #[tokio::test]
    async fn test_child_failure_leaves_nothing_behind() {
        let store = Arc::new(MemoryStore::new());
        let source = seed_source(&store).await;
        store.fail_next_children();

        let err = cloner(store.clone(), &["ef34gh"], 20)
            .clone_card(source.card.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(store.card_count(), 1);
        assert_eq!(store.memory_count(), 3);
        assert!(!store.all_slugs().contains(&"ef34gh".to_string()));
    }

    #[tokio::test]
    async fn test_repeated_duplicates_get_distinct_slugs() {
        let store = Arc::new(MemoryStore::new());
        let source = seed_source(&store).await;
        let cloner = CardCloner::new(store.clone(), Arc::new(RandomSlugs::new(6)), 20);

        for _ in 0..10 {
            cloner.clone_card(source.card.id).await.unwrap();
        }

        let slugs = store.all_slugs();
        let unique: HashSet<_> = slugs.iter().collect();
        assert_eq!(slugs.len(), 11);
        assert_eq!(unique.len(), 11);
    }
}
