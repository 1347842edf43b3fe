use super::coupon_service::{CouponEvaluator, CouponService};
use super::shipping_service::effective_fee;
use crate::config::ShopConfig;
use crate::entities::{
    OrderStatus, order_entity as orders, order_item_entity as order_items,
    product_entity as products, shipping_method_entity as shipping_methods,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{generate_order_number, validate_phone};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::BTreeMap;

const MAX_QUANTITY_PER_LINE: i32 = 99;
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// 合并同一商品的多行，保持首次出现的顺序
pub fn merge_cart_items(items: &[CartItemRequest]) -> AppResult<Vec<CartItemRequest>> {
    if items.is_empty() {
        return Err(AppError::ValidationError("Cart is empty".to_string()));
    }
    let mut merged: Vec<CartItemRequest> = Vec::new();
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::ValidationError(format!(
                "Quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        let too_many = || {
            AppError::ValidationError(format!(
                "Quantity for product {} cannot exceed {MAX_QUANTITY_PER_LINE}",
                item.product_id
            ))
        };
        if item.quantity > MAX_QUANTITY_PER_LINE {
            return Err(too_many());
        }
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => {
                // 两项都不超过上限，相加不会溢出
                existing.quantity += item.quantity;
                if existing.quantity > MAX_QUANTITY_PER_LINE {
                    return Err(too_many());
                }
            }
            None => merged.push(item.clone()),
        }
    }
    Ok(merged)
}

/// 计算每行金额与小计；商品必须存在、上架且库存足够
pub fn price_lines(
    items: &[CartItemRequest],
    catalog: &BTreeMap<i64, products::Model>,
) -> AppResult<(Vec<QuoteLine>, Decimal)> {
    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal = Decimal::ZERO;

    for item in items {
        let product = catalog
            .get(&item.product_id)
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                AppError::ValidationError(format!("Product {} is not available", item.product_id))
            })?;
        if !product.has_stock_for(item.quantity) {
            return Err(AppError::ValidationError(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }

        let line_total = product.price * Decimal::from(item.quantity);
        subtotal += line_total;
        lines.push(QuoteLine {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity: item.quantity,
            line_total,
        });
    }

    Ok((lines, subtotal))
}

/// 应付金额 = 小计 - 折扣 + 运费，不小于 0
pub fn order_total(subtotal: Decimal, discount: Decimal, shipping_fee: Decimal) -> Decimal {
    (subtotal - discount + shipping_fee).max(Decimal::ZERO)
}

/// 收货信息校验，返回规范化后的手机号
pub fn validate_customer(request: &PlaceOrderRequest) -> AppResult<String> {
    if request.customer_name.trim().is_empty() {
        return Err(AppError::ValidationError("Customer name is required".to_string()));
    }
    if request.shipping_address.trim().is_empty() {
        return Err(AppError::ValidationError("Shipping address is required".to_string()));
    }
    if let Some(email) = request.customer_email.as_deref().map(str::trim)
        && !email.is_empty()
        && !email.contains('@')
    {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    if let Some(date) = request.delivery_date
        && date < Utc::now().date_naive()
    {
        return Err(AppError::ValidationError(
            "Delivery date cannot be in the past".to_string(),
        ));
    }
    validate_phone(&request.customer_phone)
}

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    evaluator: CouponEvaluator,
    shop: ShopConfig,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection, evaluator: CouponEvaluator, shop: ShopConfig) -> Self {
        Self {
            pool,
            evaluator,
            shop,
        }
    }

    /// 结算试算，不占用优惠码与库存
    pub async fn quote(&self, request: &QuoteRequest) -> AppResult<QuoteResponse> {
        self.build_quote(
            &self.pool,
            &request.items,
            request.coupon_code.as_deref(),
            request.shipping_method_id,
        )
        .await
        .map(|(quote, _)| quote)
    }

    async fn build_quote<C: ConnectionTrait>(
        &self,
        conn: &C,
        items: &[CartItemRequest],
        coupon_code: Option<&str>,
        shipping_method_id: Option<i64>,
    ) -> AppResult<(QuoteResponse, Option<i64>)> {
        let items = merge_cart_items(items)?;
        let ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
        let catalog: BTreeMap<i64, products::Model> = products::Entity::find()
            .filter(products::Column::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let (lines, subtotal) = price_lines(&items, &catalog)?;

        let coupon = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => Some(self.evaluator.evaluate(code, subtotal).await?),
            None => None,
        };
        let discount_amount = coupon
            .as_ref()
            .map(|c| c.discount_amount)
            .unwrap_or(Decimal::ZERO);

        let shipping_fee = match shipping_method_id {
            Some(id) => {
                let method = shipping_methods::Entity::find_by_id(id)
                    .filter(shipping_methods::Column::IsActive.eq(true))
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        AppError::ValidationError("Shipping method is not available".to_string())
                    })?;
                effective_fee(
                    &method,
                    subtotal - discount_amount,
                    self.shop.free_shipping_threshold,
                )
            }
            None => Decimal::ZERO,
        };

        let quote = QuoteResponse {
            lines,
            subtotal,
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            discount_amount,
            shipping_method_id,
            shipping_fee,
            total: order_total(subtotal, discount_amount, shipping_fee),
            currency: self.shop.currency.clone(),
        };
        Ok((quote, coupon.map(|c| c.coupon_id)))
    }

    /// 下单：占用优惠码、扣减库存、写入订单与明细在同一事务内完成
    pub async fn place_order(&self, request: PlaceOrderRequest) -> AppResult<OrderResponse> {
        let phone = validate_customer(&request)?;

        let txn = self.pool.begin().await?;
        let (quote, coupon_id) = self
            .build_quote(
                &txn,
                &request.items,
                request.coupon_code.as_deref(),
                request.shipping_method_id,
            )
            .await?;

        if let Some(coupon_id) = coupon_id {
            CouponService::redeem(&txn, coupon_id).await?;
        }

        for line in &quote.lines {
            let result = products::Entity::update_many()
                .col_expr(
                    products::Column::Stock,
                    Expr::col(products::Column::Stock).sub(line.quantity),
                )
                .filter(products::Column::Id.eq(line.product_id))
                .filter(products::Column::Stock.is_not_null())
                .filter(products::Column::Stock.gte(line.quantity))
                .exec(&txn)
                .await?;
            if result.rows_affected == 0 {
                // 不限库存的商品不会被更新
                let unlimited = products::Entity::find_by_id(line.product_id)
                    .filter(products::Column::Stock.is_null())
                    .count(&txn)
                    .await?
                    > 0;
                if !unlimited {
                    return Err(AppError::ValidationError(format!(
                        "Insufficient stock for {}",
                        line.product_name
                    )));
                }
            }
        }

        let now = Utc::now();
        let order_number = self.unused_order_number(&txn).await?;
        let order = orders::ActiveModel {
            order_number: Set(order_number),
            customer_name: Set(request.customer_name.trim().to_string()),
            customer_phone: Set(phone),
            customer_email: Set(normalize_optional_text(request.customer_email)),
            shipping_address: Set(request.shipping_address.trim().to_string()),
            delivery_date: Set(request.delivery_date),
            note: Set(normalize_optional_text(request.note)),
            subtotal: Set(quote.subtotal),
            discount_amount: Set(quote.discount_amount),
            shipping_fee: Set(quote.shipping_fee),
            total: Set(quote.total),
            coupon_id: Set(coupon_id),
            coupon_code: Set(quote.coupon_code.clone()),
            shipping_method_id: Set(quote.shipping_method_id),
            status: Set(OrderStatus::Pending),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let rows = quote.lines.iter().map(|line| order_items::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(Some(line.product_id)),
            product_name: Set(line.product_name.clone()),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            line_total: Set(line.line_total),
            ..Default::default()
        });
        order_items::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(&txn)
            .await?;
        txn.commit().await?;

        log::info!(
            "Order {} placed: total {} {}",
            order.order_number,
            order.total,
            self.shop.currency
        );
        Ok(OrderResponse::from_parts(order, items))
    }

    async fn unused_order_number<C: ConnectionTrait>(&self, conn: &C) -> AppResult<String> {
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = generate_order_number(Utc::now());
            let taken = orders::Entity::find()
                .filter(orders::Column::OrderNumber.eq(candidate.as_str()))
                .count(conn)
                .await?;
            if taken == 0 {
                return Ok(candidate);
            }
        }
        Err(AppError::InternalError(
            "Could not allocate an order number".to_string(),
        ))
    }

    pub async fn get_by_number(&self, order_number: &str) -> AppResult<OrderResponse> {
        let order = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number.trim()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        self.with_items(order).await
    }

    pub async fn list(&self, query: &OrderQuery) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = orders::Entity::find();
        if let Some(status) = query.status {
            base_query = base_query.filter(orders::Column::Status.eq(status));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let models = base_query
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(params.page_size())
            .offset(params.offset())
            .all(&self.pool)
            .await?;

        let mut data = Vec::with_capacity(models.len());
        for order in models {
            data.push(self.with_items(order).await?);
        }
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn update_status(&self, id: i64, status: OrderStatus) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if !order.status.can_transition_to(status) {
            return Err(AppError::ValidationError(format!(
                "Cannot change order status from {} to {status}",
                order.status
            )));
        }

        let previous = order.status;
        let mut am = order.into_active_model();
        am.status = Set(status);
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&self.pool).await?;

        log::info!(
            "Order {} status changed: {previous} -> {status}",
            updated.order_number
        );
        self.with_items(updated).await
    }

    async fn with_items(&self, order: orders::Model) -> AppResult<OrderResponse> {
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(OrderResponse::from_parts(order, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: i64, price: Decimal, stock: Option<i32>, is_active: bool) -> products::Model {
        products::Model {
            id,
            category_id: None,
            name: format!("Bouquet {id}"),
            slug: format!("bouquet-{id}"),
            description: None,
            price,
            image_url: None,
            stock,
            is_active,
            created_at: None,
            updated_at: None,
        }
    }

    fn item(product_id: i64, quantity: i32) -> CartItemRequest {
        CartItemRequest {
            product_id,
            quantity,
        }
    }

    fn catalog(products: Vec<products::Model>) -> BTreeMap<i64, products::Model> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    fn place_request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            items: vec![item(1, 1)],
            coupon_code: None,
            shipping_method_id: None,
            customer_name: "Mint".to_string(),
            customer_phone: "081-234-5678".to_string(),
            customer_email: Some("mint@example.com".to_string()),
            shipping_address: "99 Sukhumvit Rd, Bangkok".to_string(),
            delivery_date: None,
            note: None,
        }
    }

    #[test]
    fn test_merge_cart_items() {
        let merged = merge_cart_items(&[item(2, 1), item(1, 2), item(2, 3)]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!((merged[0].product_id, merged[0].quantity), (2, 4));
        assert_eq!((merged[1].product_id, merged[1].quantity), (1, 2));

        assert!(merge_cart_items(&[]).is_err());
        assert!(merge_cart_items(&[item(1, 0)]).is_err());
        assert!(merge_cart_items(&[item(1, 60), item(1, 60)]).is_err());
        assert!(merge_cart_items(&[item(1, 99)]).is_ok());
        assert!(merge_cart_items(&[item(1, 100)]).is_err());
    }

    #[test]
    fn test_merge_cart_items_rejects_huge_quantities() {
        assert!(matches!(
            merge_cart_items(&[item(1, i32::MAX), item(1, 2)]),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            merge_cart_items(&[item(1, 98), item(2, 1), item(1, i32::MAX)]),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            merge_cart_items(&[item(1, 50), item(1, 49)]),
            Ok(ref merged) if merged[0].quantity == 99
        ));
    }

    #[test]
    fn test_price_lines() {
        let catalog = catalog(vec![
            product(1, dec!(450), None, true),
            product(2, dec!(1290.50), Some(5), true),
        ]);
        let (lines, subtotal) = price_lines(&[item(1, 2), item(2, 1)], &catalog).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_total, dec!(900));
        assert_eq!(subtotal, dec!(2190.50));
    }

    #[test]
    fn test_price_lines_rejects_unavailable_products() {
        let catalog = catalog(vec![
            product(1, dec!(450), Some(1), true),
            product(2, dec!(300), None, false),
        ]);
        assert!(price_lines(&[item(1, 2)], &catalog).is_err());
        assert!(price_lines(&[item(2, 1)], &catalog).is_err());
        assert!(price_lines(&[item(3, 1)], &catalog).is_err());
    }

    #[test]
    fn test_order_total() {
        assert_eq!(order_total(dec!(1200), dec!(100), dec!(80)), dec!(1180));
        assert_eq!(order_total(dec!(30), dec!(30), dec!(0)), dec!(0));
        assert_eq!(order_total(dec!(30), dec!(30), dec!(50)), dec!(50));
    }

    #[test]
    fn test_validate_customer() {
        assert_eq!(validate_customer(&place_request()).unwrap(), "0812345678");

        let mut request = place_request();
        request.customer_name = "  ".to_string();
        assert!(validate_customer(&request).is_err());

        let mut request = place_request();
        request.shipping_address = String::new();
        assert!(validate_customer(&request).is_err());

        let mut request = place_request();
        request.customer_email = Some("not-an-email".to_string());
        assert!(validate_customer(&request).is_err());

        let mut request = place_request();
        request.customer_phone = "12".to_string();
        assert!(validate_customer(&request).is_err());
    }
}
