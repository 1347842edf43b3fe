use crate::entities::{CouponType, coupon_entity as coupons};
use crate::error::{AppError, AppResult, CouponRejection};
use crate::models::*;
use crate::store::CouponStore;
use crate::store::sea_orm_store::is_unique_violation;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

/// 计算优惠金额（纯函数，不修改任何数据）
///
/// 校验顺序: 停用 -> 过期 -> 次数用尽 -> 最低消费，第一个失败即返回。
/// 结果不超过订单小计，并按最小货币单位向下取整（不四舍五入）。
pub fn compute_discount(
    coupon: &coupons::Model,
    subtotal: Decimal,
    now: DateTime<Utc>,
    currency_scale: u32,
) -> Result<Decimal, CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Disabled);
    }
    if coupon.is_expired_at(now) {
        return Err(CouponRejection::Expired);
    }
    if coupon.is_exhausted() {
        return Err(CouponRejection::LimitReached);
    }
    if let Some(min_spend) = coupon.min_spend
        && subtotal < min_spend
    {
        return Err(CouponRejection::BelowMinSpend { min_spend });
    }

    let mut raw = match coupon.discount_type {
        CouponType::Percent => {
            let raw = subtotal * coupon.discount / Decimal::ONE_HUNDRED;
            match coupon.max_discount {
                Some(cap) if raw > cap => cap,
                _ => raw,
            }
        }
        CouponType::Flat => coupon.discount,
    };

    // 折扣不能超过订单金额
    if raw > subtotal {
        raw = subtotal;
    }
    if raw < Decimal::ZERO {
        raw = Decimal::ZERO;
    }

    Ok(raw.round_dp_with_strategy(currency_scale, RoundingStrategy::ToNegativeInfinity))
}

/// 校验优惠券配置
pub fn validate_coupon_terms(
    discount: Decimal,
    discount_type: CouponType,
    min_spend: Option<Decimal>,
    max_discount: Option<Decimal>,
    usage_limit: Option<i32>,
) -> AppResult<()> {
    if discount <= Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Discount must be greater than 0".to_string(),
        ));
    }
    if discount_type == CouponType::Percent && discount > Decimal::ONE_HUNDRED {
        return Err(AppError::ValidationError(
            "Percent discount cannot exceed 100".to_string(),
        ));
    }
    if matches!(min_spend, Some(v) if v < Decimal::ZERO) {
        return Err(AppError::ValidationError(
            "Minimum spend cannot be negative".to_string(),
        ));
    }
    if matches!(max_discount, Some(v) if v < Decimal::ZERO) {
        return Err(AppError::ValidationError(
            "Maximum discount cannot be negative".to_string(),
        ));
    }
    if matches!(usage_limit, Some(v) if v < 0) {
        return Err(AppError::ValidationError(
            "Usage limit cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn normalize_code(code: &str) -> AppResult<String> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::ValidationError("Coupon code is required".to_string()));
    }
    if code.len() > 64 {
        return Err(AppError::ValidationError(
            "Coupon code must be at most 64 characters".to_string(),
        ));
    }
    Ok(code.to_uppercase())
}

/// 优惠码校验器：只读，可并发调用
#[derive(Clone)]
pub struct CouponEvaluator {
    store: Arc<dyn CouponStore>,
    currency_scale: u32,
}

impl CouponEvaluator {
    pub fn new(store: Arc<dyn CouponStore>, currency_scale: u32) -> Self {
        Self {
            store,
            currency_scale,
        }
    }

    pub async fn evaluate(&self, code: &str, subtotal: Decimal) -> AppResult<CouponEvaluation> {
        self.evaluate_at(code, subtotal, Utc::now()).await
    }

    pub async fn evaluate_at(
        &self,
        code: &str,
        subtotal: Decimal,
        now: DateTime<Utc>,
    ) -> AppResult<CouponEvaluation> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CouponRejection::MissingCode.into());
        }

        let coupon = self
            .store
            .find_coupon_by_code(&code.to_uppercase())
            .await?
            .ok_or(CouponRejection::NotFound)?;

        let discount_amount = compute_discount(&coupon, subtotal, now, self.currency_scale)?;

        Ok(CouponEvaluation {
            coupon_id: coupon.id,
            code: coupon.code,
            discount_amount,
        })
    }
}

#[derive(Clone)]
pub struct CouponService {
    pool: DatabaseConnection,
    evaluator: CouponEvaluator,
}

impl CouponService {
    pub fn new(pool: DatabaseConnection, evaluator: CouponEvaluator) -> Self {
        Self { pool, evaluator }
    }

    /// 结算页校验优惠码
    pub async fn check(&self, request: CheckCouponRequest) -> AppResult<CouponEvaluation> {
        if request.subtotal < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Subtotal cannot be negative".to_string(),
            ));
        }
        self.evaluator.evaluate(&request.code, request.subtotal).await
    }

    /// 占用一次使用次数（下单事务内调用）
    ///
    /// 条件更新保证并发下 used_count 不会超过 usage_limit。
    pub async fn redeem<C: ConnectionTrait>(conn: &C, coupon_id: i64) -> AppResult<()> {
        let result = coupons::Entity::update_many()
            .col_expr(
                coupons::Column::UsedCount,
                Expr::col(coupons::Column::UsedCount).add(1),
            )
            .col_expr(coupons::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coupons::Column::Id.eq(coupon_id))
            .filter(
                Condition::any()
                    .add(coupons::Column::UsageLimit.is_null())
                    .add(
                        Expr::col(coupons::Column::UsedCount)
                            .lt(Expr::col(coupons::Column::UsageLimit)),
                    ),
            )
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(CouponRejection::LimitReached.into());
        }
        log::info!("Coupon {coupon_id} redeemed");
        Ok(())
    }

    pub async fn list(&self, query: &CouponQuery) -> AppResult<PaginatedResponse<CouponResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = coupons::Entity::find();
        if let Some(is_active) = query.is_active {
            base_query = base_query.filter(coupons::Column::IsActive.eq(is_active));
        }
        if let Some(search) = query.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            base_query = base_query.filter(coupons::Column::Code.contains(search.to_uppercase()));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let models = base_query
            .order_by_desc(coupons::Column::CreatedAt)
            .order_by_desc(coupons::Column::Id)
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

    pub async fn get(&self, id: i64) -> AppResult<CouponResponse> {
        Ok(self.find(id).await?.into())
    }

    pub async fn create(&self, request: CreateCouponRequest) -> AppResult<CouponResponse> {
        let code = normalize_code(&request.code)?;
        validate_coupon_terms(
            request.discount,
            request.discount_type,
            request.min_spend,
            request.max_discount,
            request.usage_limit,
        )?;
        self.ensure_code_free(&code, None).await?;

        let now = Utc::now();
        let created = coupons::ActiveModel {
            code: Set(code.clone()),
            discount: Set(request.discount),
            discount_type: Set(request.discount_type),
            min_spend: Set(request.min_spend),
            max_discount: Set(request.max_discount),
            usage_limit: Set(request.usage_limit),
            used_count: Set(0),
            is_active: Set(request.is_active.unwrap_or(true)),
            expire_at: Set(request.expire_at),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| map_code_conflict(e, &code))?;

        log::info!("Coupon {} created", created.code);
        Ok(created.into())
    }

    pub async fn update(&self, id: i64, request: UpdateCouponRequest) -> AppResult<CouponResponse> {
        let current = self.find(id).await?;

        let code = match &request.code {
            Some(code) => {
                let code = normalize_code(code)?;
                self.ensure_code_free(&code, Some(id)).await?;
                Some(code)
            }
            None => None,
        };

        // 合并后再整体校验
        let discount = request.discount.unwrap_or(current.discount);
        let discount_type = request.discount_type.unwrap_or(current.discount_type);
        let min_spend = request.min_spend.unwrap_or(current.min_spend);
        let max_discount = request.max_discount.unwrap_or(current.max_discount);
        let usage_limit = request.usage_limit.unwrap_or(current.usage_limit);
        validate_coupon_terms(discount, discount_type, min_spend, max_discount, usage_limit)?;

        let mut am = current.into_active_model();
        if let Some(code) = &code {
            am.code = Set(code.clone());
        }
        am.discount = Set(discount);
        am.discount_type = Set(discount_type);
        am.min_spend = Set(min_spend);
        am.max_discount = Set(max_discount);
        am.usage_limit = Set(usage_limit);
        if let Some(is_active) = request.is_active {
            am.is_active = Set(is_active);
        }
        if let Some(expire_at) = request.expire_at {
            am.expire_at = Set(expire_at);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(&self.pool).await.map_err(|e| match &code {
            Some(code) => map_code_conflict(e, code),
            None => e.into(),
        })?;
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = coupons::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Coupon not found".to_string()));
        }
        Ok(())
    }

    async fn find(&self, id: i64) -> AppResult<coupons::Model> {
        coupons::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))
    }

    async fn ensure_code_free(&self, code: &str, except_id: Option<i64>) -> AppResult<()> {
        let mut query = coupons::Entity::find().filter(coupons::Column::Code.eq(code));
        if let Some(id) = except_id {
            query = query.filter(coupons::Column::Id.ne(id));
        }
        if query.count(&self.pool).await? > 0 {
            return Err(AppError::Conflict(format!("Coupon code {code} already exists")));
        }
        Ok(())
    }
}

fn map_code_conflict(err: sea_orm::DbErr, code: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(format!("Coupon code {code} already exists"))
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(code: &str, discount: Decimal, discount_type: CouponType) -> coupons::Model {
        coupons::Model {
            id: 0,
            code: code.to_string(),
            discount,
            discount_type,
            min_spend: None,
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            is_active: true,
            expire_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn evaluator_with(coupons: Vec<coupons::Model>) -> (CouponEvaluator, Vec<i64>) {
        let store = Arc::new(MemoryStore::new());
        let ids = coupons
            .into_iter()
            .map(|c| store.insert_coupon(c).id)
            .collect();
        (CouponEvaluator::new(store, 0), ids)
    }

    #[tokio::test]
    async fn test_percent_discount_capped_by_max_discount() {
        let mut save10 = coupon("SAVE10", dec!(10), CouponType::Percent);
        save10.min_spend = Some(dec!(500));
        save10.max_discount = Some(dec!(100));
        save10.usage_limit = Some(5);
        let (evaluator, ids) = evaluator_with(vec![save10]);

        let result = evaluator.evaluate("SAVE10", dec!(1200)).await.unwrap();
        assert_eq!(result.discount_amount, dec!(100));
        assert_eq!(result.code, "SAVE10");
        assert_eq!(result.coupon_id, ids[0]);
    }

    #[tokio::test]
    async fn test_flat_discount_clamped_to_subtotal() {
        let mut flat50 = coupon("FLAT50", dec!(50), CouponType::Flat);
        flat50.min_spend = Some(dec!(0));
        let (evaluator, _) = evaluator_with(vec![flat50]);

        let result = evaluator.evaluate("FLAT50", dec!(30)).await.unwrap();
        assert_eq!(result.discount_amount, dec!(30));
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let (evaluator, _) = evaluator_with(vec![coupon("ROSES", dec!(5), CouponType::Percent)]);
        let result = evaluator.evaluate("  roses ", dec!(200)).await.unwrap();
        assert_eq!(result.code, "ROSES");
        assert_eq!(result.discount_amount, dec!(10));
    }

    #[tokio::test]
    async fn test_missing_and_unknown_code() {
        let (evaluator, _) = evaluator_with(vec![]);
        let err = evaluator.evaluate("   ", dec!(100)).await.unwrap_err();
        assert!(matches!(err, AppError::Coupon(CouponRejection::MissingCode)));

        let err = evaluator.evaluate("NOPE", dec!(100)).await.unwrap_err();
        assert!(matches!(err, AppError::Coupon(CouponRejection::NotFound)));
    }

    #[test]
    fn test_discount_is_floored_not_rounded() {
        // 127 * 10% = 12.7 -> 12
        let c = coupon("TEN", dec!(10), CouponType::Percent);
        assert_eq!(compute_discount(&c, dec!(127), Utc::now(), 0), Ok(dec!(12)));
        // 两位小数货币: 12.345 * 10% = 1.2345 -> 1.23
        assert_eq!(
            compute_discount(&c, dec!(12.345), Utc::now(), 2),
            Ok(dec!(1.23))
        );
        // 19.99 flat -> 19
        let flat = coupon("FLAT", dec!(19.99), CouponType::Flat);
        assert_eq!(compute_discount(&flat, dec!(100), Utc::now(), 0), Ok(dec!(19)));
    }

    #[test]
    fn test_limit_reached_when_used_equals_limit() {
        let mut c = coupon("LIMITED", dec!(10), CouponType::Percent);
        c.usage_limit = Some(3);
        c.used_count = 3;
        c.min_spend = Some(dec!(10000));
        assert_eq!(
            compute_discount(&c, dec!(100), Utc::now(), 0),
            Err(CouponRejection::LimitReached)
        );

        c.usage_limit = Some(0);
        c.used_count = 0;
        assert_eq!(
            compute_discount(&c, dec!(100), Utc::now(), 0),
            Err(CouponRejection::LimitReached)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let mut c = coupon("EXP", dec!(10), CouponType::Flat);

        c.expire_at = Some(now);
        assert_eq!(compute_discount(&c, dec!(100), now, 0), Ok(dec!(10)));

        c.expire_at = Some(now - Duration::seconds(1));
        assert_eq!(
            compute_discount(&c, dec!(100), now, 0),
            Err(CouponRejection::Expired)
        );
    }

    #[test]
    fn test_rejection_order() {
        let now = Utc::now();
        let mut c = coupon("ALL", dec!(10), CouponType::Flat);
        c.is_active = false;
        c.expire_at = Some(now - Duration::days(1));
        c.usage_limit = Some(1);
        c.used_count = 1;
        c.min_spend = Some(dec!(1000));

        assert_eq!(compute_discount(&c, dec!(1), now, 0), Err(CouponRejection::Disabled));
        c.is_active = true;
        assert_eq!(compute_discount(&c, dec!(1), now, 0), Err(CouponRejection::Expired));
        c.expire_at = None;
        assert_eq!(
            compute_discount(&c, dec!(1), now, 0),
            Err(CouponRejection::LimitReached)
        );
        c.usage_limit = None;
        assert_eq!(
            compute_discount(&c, dec!(1), now, 0),
            Err(CouponRejection::BelowMinSpend {
                min_spend: dec!(1000)
            })
        );
    }

    #[test]
    fn test_min_spend_is_inclusive() {
        let mut c = coupon("MIN", dec!(10), CouponType::Flat);
        c.min_spend = Some(dec!(500));
        assert_eq!(compute_discount(&c, dec!(500), Utc::now(), 0), Ok(dec!(10)));
        assert!(compute_discount(&c, dec!(499.99), Utc::now(), 0).is_err());
    }

    #[test]
    fn test_discount_never_exceeds_cap_or_subtotal() {
        let mut c = coupon("PCT", dec!(100), CouponType::Percent);
        c.max_discount = Some(dec!(250));
        for subtotal in [dec!(0), dec!(1), dec!(99.5), dec!(249), dec!(250), dec!(10000)] {
            let discount = compute_discount(&c, subtotal, Utc::now(), 0).unwrap();
            assert!(discount <= dec!(250));
            assert!(discount <= subtotal);
            assert!(discount >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_validate_coupon_terms() {
        assert!(validate_coupon_terms(dec!(10), CouponType::Percent, None, None, None).is_ok());
        assert!(validate_coupon_terms(dec!(0), CouponType::Flat, None, None, None).is_err());
        assert!(validate_coupon_terms(dec!(101), CouponType::Percent, None, None, None).is_err());
        assert!(validate_coupon_terms(dec!(500), CouponType::Flat, None, None, None).is_ok());
        assert!(
            validate_coupon_terms(dec!(10), CouponType::Flat, Some(dec!(-1)), None, None).is_err()
        );
        assert!(validate_coupon_terms(dec!(10), CouponType::Flat, None, None, Some(-1)).is_err());
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" save10 ").unwrap(), "SAVE10");
        assert!(normalize_code("  ").is_err());
    }
}
