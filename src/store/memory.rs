//! 测试用内存存储：模拟唯一约束、事务回滚与并发抢占 slug

use super::{CardAggregate, CardAggregateDraft, CardStore, CouponStore, CreateCardError};
use crate::entities::{
    card_memory_entity as memories, coupon_entity as coupons, product_entity as products,
    valentine_card_entity as cards,
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    next_id: i64,
    coupons: Vec<coupons::Model>,
    products: Vec<products::Model>,
    cards: Vec<cards::Model>,
    memories: Vec<memories::Model>,
    links: Vec<(i64, i64)>,
    /// 预检查时不可见、写入时才冲突的 slug (模拟并发写入者)
    racing_slugs: HashSet<String>,
    fail_next_children: bool,
    slug_checks: usize,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn aggregate(&self, card: &cards::Model) -> CardAggregate {
        let mut memories: Vec<memories::Model> = self
            .memories
            .iter()
            .filter(|m| m.card_id == card.id)
            .cloned()
            .collect();
        memories.sort_by_key(|m| (m.order_index, m.id));
        let mut products: Vec<products::Model> = self
            .links
            .iter()
            .filter(|(card_id, _)| *card_id == card.id)
            .filter_map(|(_, product_id)| self.products.iter().find(|p| p.id == *product_id))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.id);
        CardAggregate {
            card: card.clone(),
            memories,
            products,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_coupon(&self, mut coupon: coupons::Model) -> coupons::Model {
        let mut inner = self.inner.lock().unwrap();
        coupon.id = inner.next_id();
        inner.coupons.push(coupon.clone());
        coupon
    }

    pub fn insert_product(&self, name: &str) -> products::Model {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let product = products::Model {
            id,
            category_id: None,
            name: name.to_string(),
            slug: format!("product-{id}"),
            description: None,
            price: rust_decimal::Decimal::new(990, 0),
            image_url: None,
            stock: None,
            is_active: true,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        inner.products.push(product.clone());
        product
    }

    /// 标记一个 slug 已被"并发请求"占用：slug_exists 看不到，写入时冲突
    pub fn add_racing_slug(&self, slug: &str) {
        self.inner.lock().unwrap().racing_slugs.insert(slug.to_string());
    }

    /// 下一次写入子记录时失败
    pub fn fail_next_children(&self) {
        self.inner.lock().unwrap().fail_next_children = true;
    }

    pub fn card_count(&self) -> usize {
        self.inner.lock().unwrap().cards.len()
    }

    pub fn memory_count(&self) -> usize {
        self.inner.lock().unwrap().memories.len()
    }

    pub fn product_count(&self) -> usize {
        self.inner.lock().unwrap().products.len()
    }

    pub fn slug_checks(&self) -> usize {
        self.inner.lock().unwrap().slug_checks
    }

    pub fn all_slugs(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.cards.iter().map(|c| c.slug.clone()).collect()
    }
}

#[async_trait]
impl CouponStore for MemoryStore {
    async fn find_coupon_by_code(&self, code: &str) -> Result<Option<coupons::Model>, DbErr> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.coupons.iter().find(|c| c.code == code).cloned())
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn find_card_aggregate(&self, id: i64) -> Result<Option<CardAggregate>, DbErr> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cards
            .iter()
            .find(|c| c.id == id)
            .map(|card| inner.aggregate(card)))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let mut inner = self.inner.lock().unwrap();
        inner.slug_checks += 1;
        Ok(inner.cards.iter().any(|c| c.slug == slug))
    }

    async fn create_card_aggregate(
        &self,
        draft: &CardAggregateDraft,
    ) -> Result<CardAggregate, CreateCardError> {
        let mut inner = self.inner.lock().unwrap();
        let slug = &draft.card.slug;
        if inner.racing_slugs.remove(slug) || inner.cards.iter().any(|c| &c.slug == slug) {
            return Err(CreateCardError::SlugTaken);
        }

        let now = Utc::now();
        let card_id = inner.next_id();
        let card = cards::Model {
            id: card_id,
            slug: slug.clone(),
            name: draft.card.name.clone(),
            recipient_name: draft.card.recipient_name.clone(),
            sender_name: draft.card.sender_name.clone(),
            message: draft.card.message.clone(),
            theme: draft.card.theme.clone(),
            background_color: draft.card.background_color.clone(),
            music_url: draft.card.music_url.clone(),
            status: draft.card.status,
            disabled_at: draft.card.disabled_at,
            created_at: Some(now),
            updated_at: Some(now),
        };
        inner.cards.push(card.clone());

        // 子记录阶段失败：回滚根记录
        if inner.fail_next_children {
            inner.fail_next_children = false;
            inner.cards.retain(|c| c.id != card_id);
            return Err(CreateCardError::Db(DbErr::Custom(
                "injected child insert failure".into(),
            )));
        }

        for m in &draft.memories {
            let id = inner.next_id();
            inner.memories.push(memories::Model {
                id,
                card_id,
                memory_type: m.memory_type,
                media_url: m.media_url.clone(),
                caption: m.caption.clone(),
                thumbnail_url: m.thumbnail_url.clone(),
                order_index: m.order_index,
                created_at: Some(now),
            });
        }
        for product_id in &draft.product_ids {
            inner.links.push((card_id, *product_id));
        }

        Ok(inner.aggregate(&card))
    }
}
