use crate::models::*;
use crate::services::ShippingService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/shipping-methods",
    tag = "shipping",
    responses(
        (status = 200, description = "获取配送方式成功", body = [ShippingMethodResponse])
    )
)]
pub async fn list_shipping_methods(
    shipping_service: web::Data<ShippingService>,
) -> Result<HttpResponse> {
    match shipping_service.list(false).await {
        Ok(methods) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": methods
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/shipping-methods",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取全部配送方式成功", body = [ShippingMethodResponse])
    )
)]
pub async fn admin_list_shipping_methods(
    shipping_service: web::Data<ShippingService>,
) -> Result<HttpResponse> {
    match shipping_service.list(true).await {
        Ok(methods) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": methods
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/shipping-methods",
    tag = "admin",
    request_body = CreateShippingMethodRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建配送方式成功", body = ShippingMethodResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_shipping_method(
    shipping_service: web::Data<ShippingService>,
    request: web::Json<CreateShippingMethodRequest>,
) -> Result<HttpResponse> {
    match shipping_service.create(request.into_inner()).await {
        Ok(method) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": method
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/shipping-methods/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "配送方式ID")),
    request_body = UpdateShippingMethodRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新配送方式成功", body = ShippingMethodResponse),
        (status = 404, description = "配送方式不存在")
    )
)]
pub async fn update_shipping_method(
    shipping_service: web::Data<ShippingService>,
    path: web::Path<i64>,
    request: web::Json<UpdateShippingMethodRequest>,
) -> Result<HttpResponse> {
    match shipping_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(method) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": method
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/shipping-methods/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "配送方式ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除配送方式成功"),
        (status = 404, description = "配送方式不存在")
    )
)]
pub async fn delete_shipping_method(
    shipping_service: web::Data<ShippingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match shipping_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Shipping method deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn shipping_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/shipping-methods").route("", web::get().to(list_shipping_methods)));
}

pub fn shipping_admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shipping-methods")
            .route("", web::get().to(admin_list_shipping_methods))
            .route("", web::post().to(create_shipping_method))
            .route("/{id}", web::put().to(update_shipping_method))
            .route("/{id}", web::delete().to(delete_shipping_method)),
    );
}
