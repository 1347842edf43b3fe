use crate::models::*;
use crate::services::ValentineCardService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/valentine-cards/{slug}",
    tag = "valentine_card",
    params(("slug" = String, Path, description = "卡片短链接")),
    responses(
        (status = 200, description = "获取卡片成功", body = ValentineCardResponse),
        (status = 404, description = "卡片不存在或已停用")
    )
)]
pub async fn get_public_card(
    card_service: web::Data<ValentineCardService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match card_service.get_public(&path.into_inner()).await {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/valentine-cards",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("status" = Option<String>, Query, description = "状态: active/draft")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取卡片列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_cards(
    card_service: web::Data<ValentineCardService>,
    query: web::Query<ValentineCardQuery>,
) -> Result<HttpResponse> {
    match card_service.list(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/valentine-cards/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "卡片ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取卡片成功", body = ValentineCardResponse),
        (status = 404, description = "卡片不存在")
    )
)]
pub async fn get_card(
    card_service: web::Data<ValentineCardService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match card_service.get(path.into_inner()).await {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/valentine-cards",
    tag = "admin",
    request_body = CreateValentineCardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建卡片成功", body = ValentineCardResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "slug 已被占用"),
        (status = 503, description = "无法分配唯一 slug")
    )
)]
pub async fn create_card(
    card_service: web::Data<ValentineCardService>,
    request: web::Json<CreateValentineCardRequest>,
) -> Result<HttpResponse> {
    match card_service.create(request.into_inner()).await {
        Ok(card) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/valentine-cards/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "卡片ID")),
    request_body = UpdateValentineCardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新卡片成功", body = ValentineCardResponse),
        (status = 404, description = "卡片不存在"),
        (status = 409, description = "slug 已被占用")
    )
)]
pub async fn update_card(
    card_service: web::Data<ValentineCardService>,
    path: web::Path<i64>,
    request: web::Json<UpdateValentineCardRequest>,
) -> Result<HttpResponse> {
    match card_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/valentine-cards/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "卡片ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除卡片成功"),
        (status = 404, description = "卡片不存在")
    )
)]
pub async fn delete_card(
    card_service: web::Data<ValentineCardService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match card_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Valentine card deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/valentine-cards/{id}/duplicate",
    tag = "admin",
    params(("id" = i64, Path, description = "源卡片ID")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "复制成功，返回新卡片", body = ValentineCardResponse),
        (status = 404, description = "源卡片不存在"),
        (status = 503, description = "无法分配唯一 slug")
    )
)]
pub async fn duplicate_card(
    card_service: web::Data<ValentineCardService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match card_service.duplicate(path.into_inner()).await {
        Ok(card) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn valentine_card_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/valentine-cards").route("/{slug}", web::get().to(get_public_card)),
    );
}

pub fn valentine_card_admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/valentine-cards")
            .route("", web::get().to(list_cards))
            .route("", web::post().to(create_card))
            .route("/{id}", web::get().to(get_card))
            .route("/{id}", web::put().to(update_card))
            .route("/{id}", web::delete().to(delete_card))
            .route("/{id}/duplicate", web::post().to(duplicate_card)),
    );
}
