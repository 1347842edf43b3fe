use crate::models::*;
use crate::services::CouponService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/coupons/check",
    tag = "coupon",
    request_body = CheckCouponRequest,
    responses(
        (status = 200, description = "优惠码可用，返回折扣金额", body = CouponEvaluation),
        (status = 400, description = "优惠码不可用 (停用/过期/次数用尽/未达最低消费)"),
        (status = 404, description = "优惠码不存在")
    )
)]
pub async fn check_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<CheckCouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service.check(request.into_inner()).await {
        Ok(evaluation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": evaluation
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/coupons",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("is_active" = Option<bool>, Query, description = "是否启用"),
        ("search" = Option<String>, Query, description = "按 code 搜索")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取优惠券列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_coupons(
    coupon_service: web::Data<CouponService>,
    query: web::Query<CouponQuery>,
) -> Result<HttpResponse> {
    match coupon_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/coupons/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "优惠券ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取优惠券成功", body = CouponResponse),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn get_coupon(
    coupon_service: web::Data<CouponService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match coupon_service.get(path.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": coupon
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/coupons",
    tag = "admin",
    request_body = CreateCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建优惠券成功", body = CouponResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "优惠码已存在")
    )
)]
pub async fn create_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service.create(request.into_inner()).await {
        Ok(coupon) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": coupon
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/coupons/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "优惠券ID")),
    request_body = UpdateCouponRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新优惠券成功", body = CouponResponse),
        (status = 404, description = "优惠券不存在"),
        (status = 409, description = "优惠码已存在")
    )
)]
pub async fn update_coupon(
    coupon_service: web::Data<CouponService>,
    path: web::Path<i64>,
    request: web::Json<UpdateCouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(coupon) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": coupon
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/coupons/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "优惠券ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除优惠券成功"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn delete_coupon(
    coupon_service: web::Data<CouponService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match coupon_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Coupon deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn coupon_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/coupons").route("/check", web::post().to(check_coupon)));
}

pub fn coupon_admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coupons")
            .route("", web::get().to(list_coupons))
            .route("", web::post().to(create_coupon))
            .route("/{id}", web::get().to(get_coupon))
            .route("/{id}", web::put().to(update_coupon))
            .route("/{id}", web::delete().to(delete_coupon)),
    );
}
