use crate::entities::{category_entity as categories, product_entity as products};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::store::sea_orm_store::is_unique_violation;
use crate::utils::is_valid_slug;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

fn required_text(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(value.to_string())
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

pub fn validate_price(price: Decimal) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::ValidationError("Price cannot be negative".to_string()));
    }
    Ok(())
}

pub fn validate_stock(stock: Option<i32>) -> AppResult<()> {
    if matches!(stock, Some(v) if v < 0) {
        return Err(AppError::ValidationError("Stock cannot be negative".to_string()));
    }
    Ok(())
}

fn slug_conflict(err: DbErr, what: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(format!("{what} slug is already in use"))
    } else {
        err.into()
    }
}

#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    // ---------- 分类 ----------

    pub async fn list_categories(&self, include_inactive: bool) -> AppResult<Vec<CategoryResponse>> {
        let mut query = categories::Entity::find();
        if !include_inactive {
            query = query.filter(categories::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> AppResult<CategoryResponse> {
        let now = Utc::now();
        let created = categories::ActiveModel {
            name: Set(required_text(&request.name, "Name")?),
            slug: Set(checked_slug(&request.slug)?),
            description: Set(normalize_optional_text(request.description)),
            sort_order: Set(request.sort_order.unwrap_or(0)),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, "Category"))?;

        log::info!("Category {} created", created.slug);
        Ok(created.into())
    }

    pub async fn update_category(
        &self,
        id: i64,
        request: UpdateCategoryRequest,
    ) -> AppResult<CategoryResponse> {
        let current = categories::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let mut am = current.into_active_model();
        if let Some(name) = request.name {
            am.name = Set(required_text(&name, "Name")?);
        }
        if let Some(slug) = request.slug {
            am.slug = Set(checked_slug(&slug)?);
        }
        if let Some(description) = request.description {
            am.description = Set(normalize_optional_text(description));
        }
        if let Some(sort_order) = request.sort_order {
            am.sort_order = Set(sort_order);
        }
        if let Some(is_active) = request.is_active {
            am.is_active = Set(is_active);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am
            .update(&self.pool)
            .await
            .map_err(|e| slug_conflict(e, "Category"))?;
        Ok(updated.into())
    }

    /// 分类下的商品 category_id 置空
    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        let result = categories::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }

    // ---------- 商品 ----------

    pub async fn list_products(
        &self,
        query: &ProductQuery,
        include_inactive: bool,
    ) -> AppResult<PaginatedResponse<ProductResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = products::Entity::find();
        if !include_inactive {
            base_query = base_query.filter(products::Column::IsActive.eq(true));
        }
        if let Some(category_id) = query.category_id {
            base_query = base_query.filter(products::Column::CategoryId.eq(category_id));
        }
        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            base_query = base_query.filter(products::Column::Name.contains(search));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let models = base_query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
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

    pub async fn get_product_by_slug(&self, slug: &str) -> AppResult<ProductResponse> {
        products::Entity::find()
            .filter(products::Column::Slug.eq(slug))
            .filter(products::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn get_product(&self, id: i64) -> AppResult<ProductResponse> {
        Ok(self.find_product(id).await?.into())
    }

    pub async fn create_product(&self, request: CreateProductRequest) -> AppResult<ProductResponse> {
        validate_price(request.price)?;
        validate_stock(request.stock)?;
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
        }

        let now = Utc::now();
        let created = products::ActiveModel {
            category_id: Set(request.category_id),
            name: Set(required_text(&request.name, "Name")?),
            slug: Set(checked_slug(&request.slug)?),
            description: Set(normalize_optional_text(request.description)),
            price: Set(request.price),
            image_url: Set(normalize_optional_text(request.image_url)),
            stock: Set(request.stock),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, "Product"))?;

        log::info!("Product {} created", created.slug);
        Ok(created.into())
    }

    pub async fn update_product(
        &self,
        id: i64,
        request: UpdateProductRequest,
    ) -> AppResult<ProductResponse> {
        let current = self.find_product(id).await?;

        let mut am = current.into_active_model();
        if let Some(category_id) = request.category_id {
            if let Some(category_id) = category_id {
                self.ensure_category(category_id).await?;
            }
            am.category_id = Set(category_id);
        }
        if let Some(name) = request.name {
            am.name = Set(required_text(&name, "Name")?);
        }
        if let Some(slug) = request.slug {
            am.slug = Set(checked_slug(&slug)?);
        }
        if let Some(description) = request.description {
            am.description = Set(normalize_optional_text(description));
        }
        if let Some(price) = request.price {
            validate_price(price)?;
            am.price = Set(price);
        }
        if let Some(image_url) = request.image_url {
            am.image_url = Set(normalize_optional_text(image_url));
        }
        if let Some(stock) = request.stock {
            validate_stock(stock)?;
            am.stock = Set(stock);
        }
        if let Some(is_active) = request.is_active {
            am.is_active = Set(is_active);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am
            .update(&self.pool)
            .await
            .map_err(|e| slug_conflict(e, "Product"))?;
        Ok(updated.into())
    }

    pub async fn delete_product(&self, id: i64) -> AppResult<()> {
        let result = products::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }

    async fn find_product(&self, id: i64) -> AppResult<products::Model> {
        products::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    async fn ensure_category(&self, id: i64) -> AppResult<()> {
        let exists = categories::Entity::find_by_id(id)
            .count(&self.pool)
            .await?;
        if exists == 0 {
            return Err(AppError::ValidationError(format!("Category {id} does not exist")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price(dec!(0)).is_ok());
        assert!(validate_price(dec!(1290.50)).is_ok());
        assert!(validate_price(dec!(-1)).is_err());

        assert!(validate_stock(None).is_ok());
        assert!(validate_stock(Some(0)).is_ok());
        assert!(validate_stock(Some(-3)).is_err());
    }

    #[test]
    fn test_required_text_and_slug() {
        assert_eq!(required_text("  Roses ", "Name").unwrap(), "Roses");
        assert!(required_text("   ", "Name").is_err());
        assert_eq!(checked_slug(" red-roses ").unwrap(), "red-roses");
        assert!(checked_slug("Red Roses").is_err());
    }
}
