use crate::middlewares::current_admin;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/checkout/quote",
    tag = "order",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "试算成功", body = QuoteResponse),
        (status = 400, description = "购物车或优惠码不可用"),
        (status = 404, description = "优惠码不存在")
    )
)]
pub async fn quote(
    order_service: web::Data<OrderService>,
    request: web::Json<QuoteRequest>,
) -> Result<HttpResponse> {
    match order_service.quote(&request).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": quote
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/checkout",
    tag = "order",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "下单成功", body = OrderResponse),
        (status = 400, description = "请求参数错误、库存不足或优惠码不可用"),
        (status = 404, description = "优惠码不存在")
    )
)]
pub async fn place_order(
    order_service: web::Data<OrderService>,
    request: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.place_order(request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{order_number}",
    tag = "order",
    params(("order_number" = String, Path, description = "订单号")),
    responses(
        (status = 200, description = "获取订单成功", body = OrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match order_service.get_by_number(&path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("status" = Option<String>, Query, description = "订单状态")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取订单列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    match order_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/orders/{id}/status",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = UpdateOrderStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新订单状态成功", body = OrderResponse),
        (status = 400, description = "不允许的状态变更"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log::info!(
        "Admin {} updating order {id} to {}",
        current_admin(&req).unwrap_or_default(),
        request.status
    );

    match order_service.update_status(id, request.status).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkout")
            .route("", web::post().to(place_order))
            .route("/quote", web::post().to(quote)),
    )
    .service(web::scope("/orders").route("/{order_number}", web::get().to(get_order)));
}

pub fn order_admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list_orders))
            .route("/{id}/status", web::put().to(update_order_status)),
    );
}
