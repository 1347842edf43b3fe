use crate::entities::shipping_method_entity as shipping_methods;
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

/// 实际运费：订单金额 (折后) 达到免运费门槛时为 0
pub fn effective_fee(
    method: &shipping_methods::Model,
    discounted_subtotal: Decimal,
    free_shipping_threshold: Option<Decimal>,
) -> Decimal {
    match free_shipping_threshold {
        Some(threshold) if discounted_subtotal >= threshold => Decimal::ZERO,
        _ => method.fee,
    }
}

fn validate_fee(fee: Decimal) -> AppResult<()> {
    if fee < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Shipping fee cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ShippingService {
    pool: DatabaseConnection,
}

impl ShippingService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<ShippingMethodResponse>> {
        let mut query = shipping_methods::Entity::find();
        if !include_inactive {
            query = query.filter(shipping_methods::Column::IsActive.eq(true));
        }
        let models = query
            .order_by_asc(shipping_methods::Column::SortOrder)
            .order_by_asc(shipping_methods::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    pub async fn create(
        &self,
        request: CreateShippingMethodRequest,
    ) -> AppResult<ShippingMethodResponse> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        validate_fee(request.fee)?;

        let now = Utc::now();
        let created = shipping_methods::ActiveModel {
            name: Set(name),
            description: Set(normalize_optional_text(request.description)),
            fee: Set(request.fee),
            estimated_days: Set(request.estimated_days),
            sort_order: Set(request.sort_order.unwrap_or(0)),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(created.into())
    }

    pub async fn update(
        &self,
        id: i64,
        request: UpdateShippingMethodRequest,
    ) -> AppResult<ShippingMethodResponse> {
        let current = shipping_methods::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Shipping method not found".to_string()))?;

        let mut am = current.into_active_model();
        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::ValidationError("Name is required".to_string()));
            }
            am.name = Set(name);
        }
        if let Some(description) = request.description {
            am.description = Set(normalize_optional_text(description));
        }
        if let Some(fee) = request.fee {
            validate_fee(fee)?;
            am.fee = Set(fee);
        }
        if let Some(estimated_days) = request.estimated_days {
            am.estimated_days = Set(estimated_days);
        }
        if let Some(sort_order) = request.sort_order {
            am.sort_order = Set(sort_order);
        }
        if let Some(is_active) = request.is_active {
            am.is_active = Set(is_active);
        }
        am.updated_at = Set(Some(Utc::now()));

        Ok(am.update(&self.pool).await?.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = shipping_methods::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Shipping method not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn method(fee: Decimal) -> shipping_methods::Model {
        shipping_methods::Model {
            id: 1,
            name: "Bangkok same-day".to_string(),
            description: None,
            fee,
            estimated_days: Some(1),
            sort_order: 0,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_effective_fee_free_shipping_threshold() {
        let m = method(dec!(80));
        assert_eq!(effective_fee(&m, dec!(999), Some(dec!(1000))), dec!(80));
        assert_eq!(effective_fee(&m, dec!(1000), Some(dec!(1000))), dec!(0));
        assert_eq!(effective_fee(&m, dec!(5000), None), dec!(80));
    }

    #[test]
    fn test_validate_fee() {
        assert!(validate_fee(dec!(0)).is_ok());
        assert!(validate_fee(dec!(-10)).is_err());
    }
}
