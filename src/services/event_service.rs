use crate::entities::{event_entity as events, event_image_entity as event_images};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::store::sea_orm_store::is_unique_violation;
use crate::utils::is_valid_slug;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};

/// 活动列表排序：按日期倒序，无日期的排在最后
fn listing_query(include_unpublished: bool) -> Select<events::Entity> {
    let mut query = events::Entity::find();
    if !include_unpublished {
        query = query.filter(events::Column::IsPublished.eq(true));
    }
    query
        .order_by_asc(Expr::col(events::Column::EventDate).is_null())
        .order_by_desc(events::Column::EventDate)
        .order_by_desc(events::Column::Id)
}

/// 相册图片输入校验；sort_order 缺省时取数组下标
pub fn build_images(inputs: &[EventImageInput]) -> AppResult<Vec<(String, Option<String>, i32)>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let url = input.image_url.trim();
            if url.is_empty() {
                return Err(AppError::ValidationError(format!(
                    "Image #{index}: image_url is required"
                )));
            }
            Ok((
                url.to_string(),
                normalize_optional_text(input.caption.clone()),
                input.sort_order.unwrap_or(index as i32),
            ))
        })
        .collect()
}

async fn insert_images<C: ConnectionTrait>(
    conn: &C,
    event_id: i64,
    images: &[(String, Option<String>, i32)],
) -> Result<(), DbErr> {
    if images.is_empty() {
        return Ok(());
    }
    let rows = images
        .iter()
        .map(|(url, caption, sort_order)| event_images::ActiveModel {
            event_id: Set(event_id),
            image_url: Set(url.clone()),
            caption: Set(caption.clone()),
            sort_order: Set(*sort_order),
            ..Default::default()
        });
    event_images::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

fn slug_conflict(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("Event slug is already in use".to_string())
    } else {
        err.into()
    }
}

fn checked_slug(slug: &str) -> AppResult<String> {
    let slug = slug.trim();
    if !is_valid_slug(slug) {
        return Err(AppError::ValidationError(
            "Slug may only contain lowercase letters, digits and '-'".to_string(),
        ));
    }
    Ok(slug.to_string())
}

fn checked_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    Ok(title.to_string())
}

#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
}

impl EventService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 已发布活动，event_date 最新的在前
    pub async fn list(
        &self,
        query: &EventQuery,
        include_unpublished: bool,
    ) -> AppResult<PaginatedResponse<EventResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = listing_query(include_unpublished);

        let total = base_query.clone().count(&self.pool).await?;
        let models = base_query
            .limit(params.page_size())
            .offset(params.offset())
            .all(&self.pool)
            .await?;

        let mut data = Vec::with_capacity(models.len());
        for event in models {
            data.push(self.with_images(&self.pool, event).await?);
        }
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn get_published(&self, slug: &str) -> AppResult<EventResponse> {
        let event = events::Entity::find()
            .filter(events::Column::Slug.eq(slug))
            .filter(events::Column::IsPublished.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        self.with_images(&self.pool, event).await
    }

    pub async fn get(&self, id: i64) -> AppResult<EventResponse> {
        let event = events::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        self.with_images(&self.pool, event).await
    }

    pub async fn create(&self, request: CreateEventRequest) -> AppResult<EventResponse> {
        let images = build_images(&request.images)?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;
        let event = events::ActiveModel {
            title: Set(checked_title(&request.title)?),
            slug: Set(checked_slug(&request.slug)?),
            description: Set(normalize_optional_text(request.description)),
            location: Set(normalize_optional_text(request.location)),
            event_date: Set(request.event_date),
            cover_image_url: Set(normalize_optional_text(request.cover_image_url)),
            is_published: Set(request.is_published.unwrap_or(false)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(slug_conflict)?;
        insert_images(&txn, event.id, &images).await?;

        let response = self.with_images(&txn, event).await?;
        txn.commit().await?;

        log::info!("Event {} created", response.slug);
        Ok(response)
    }

    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> AppResult<EventResponse> {
        let images = request.images.as_deref().map(build_images).transpose()?;

        let txn = self.pool.begin().await?;
        let current = events::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let mut am = current.into_active_model();
        if let Some(title) = request.title {
            am.title = Set(checked_title(&title)?);
        }
        if let Some(slug) = request.slug {
            am.slug = Set(checked_slug(&slug)?);
        }
        if let Some(description) = request.description {
            am.description = Set(normalize_optional_text(description));
        }
        if let Some(location) = request.location {
            am.location = Set(normalize_optional_text(location));
        }
        if let Some(event_date) = request.event_date {
            am.event_date = Set(event_date);
        }
        if let Some(cover_image_url) = request.cover_image_url {
            am.cover_image_url = Set(normalize_optional_text(cover_image_url));
        }
        if let Some(is_published) = request.is_published {
            am.is_published = Set(is_published);
        }
        am.updated_at = Set(Some(Utc::now()));
        let event = am.update(&txn).await.map_err(slug_conflict)?;

        if let Some(images) = &images {
            event_images::Entity::delete_many()
                .filter(event_images::Column::EventId.eq(id))
                .exec(&txn)
                .await?;
            insert_images(&txn, id, images).await?;
        }

        let response = self.with_images(&txn, event).await?;
        txn.commit().await?;
        Ok(response)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = events::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        Ok(())
    }

    async fn with_images<C: ConnectionTrait>(
        &self,
        conn: &C,
        event: events::Model,
    ) -> AppResult<EventResponse> {
        let images = event_images::Entity::find()
            .filter(event_images::Column::EventId.eq(event.id))
            .order_by_asc(event_images::Column::SortOrder)
            .order_by_asc(event_images::Column::Id)
            .all(conn)
            .await?;
        Ok(EventResponse::from_parts(event, images))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str, sort_order: Option<i32>) -> EventImageInput {
        EventImageInput {
            image_url: url.to_string(),
            caption: Some(" ".to_string()),
            sort_order,
        }
    }

    #[test]
    fn test_build_images() {
        let images = build_images(&[
            image("https://cdn.example.com/1.jpg", None),
            image(" https://cdn.example.com/2.jpg ", Some(7)),
        ])
        .unwrap();
        assert_eq!(images[0], ("https://cdn.example.com/1.jpg".to_string(), None, 0));
        assert_eq!(images[1].0, "https://cdn.example.com/2.jpg");
        assert_eq!(images[1].2, 7);

        assert!(build_images(&[image("  ", None)]).is_err());
    }

    #[test]
    fn test_listing_query_puts_undated_events_last() {
        use sea_orm::{DbBackend, QueryTrait};

        let sql = listing_query(false).build(DbBackend::Postgres).to_string();
        assert!(sql.contains(r#""is_published" = TRUE"#));
        let order_by = &sql[sql.find("ORDER BY").unwrap()..];
        assert!(order_by.contains(r#""event_date" IS NULL ASC"#));
        assert!(
            order_by.find("IS NULL ASC").unwrap() < order_by.find(r#""event_date" DESC"#).unwrap()
        );

        let sql = listing_query(true).build(DbBackend::Postgres).to_string();
        assert!(!sql.contains("is_published"));
    }

    #[test]
    fn test_checked_title_and_slug() {
        assert_eq!(checked_title(" Wedding fair ").unwrap(), "Wedding fair");
        assert!(checked_title("").is_err());
        assert!(checked_slug("wedding-fair-2026").is_ok());
        assert!(checked_slug("Wedding Fair").is_err());
    }
}
