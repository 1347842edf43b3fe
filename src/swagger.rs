use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{CardStatus, CouponType, MemoryType, OrderStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::me,
        handlers::catalog::list_categories,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::admin_list_categories,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::admin_list_products,
        handlers::catalog::admin_get_product,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::coupon::check_coupon,
        handlers::coupon::list_coupons,
        handlers::coupon::get_coupon,
        handlers::coupon::create_coupon,
        handlers::coupon::update_coupon,
        handlers::coupon::delete_coupon,
        handlers::shipping::list_shipping_methods,
        handlers::shipping::admin_list_shipping_methods,
        handlers::shipping::create_shipping_method,
        handlers::shipping::update_shipping_method,
        handlers::shipping::delete_shipping_method,
        handlers::order::quote,
        handlers::order::place_order,
        handlers::order::get_order,
        handlers::order::list_orders,
        handlers::order::update_order_status,
        handlers::valentine_card::get_public_card,
        handlers::valentine_card::list_cards,
        handlers::valentine_card::get_card,
        handlers::valentine_card::create_card,
        handlers::valentine_card::update_card,
        handlers::valentine_card::delete_card,
        handlers::valentine_card::duplicate_card,
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::admin_list_events,
        handlers::event::admin_get_event,
        handlers::event::create_event,
        handlers::event::update_event,
        handlers::event::delete_event,
    ),
    components(
        schemas(
            ApiError,
            LoginRequest,
            LoginResponse,
            CategoryResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            ProductResponse,
            CreateProductRequest,
            UpdateProductRequest,
            CouponType,
            CheckCouponRequest,
            CouponEvaluation,
            CouponResponse,
            CreateCouponRequest,
            UpdateCouponRequest,
            ShippingMethodResponse,
            CreateShippingMethodRequest,
            UpdateShippingMethodRequest,
            OrderStatus,
            CartItemRequest,
            QuoteRequest,
            QuoteLine,
            QuoteResponse,
            PlaceOrderRequest,
            OrderItemResponse,
            OrderResponse,
            UpdateOrderStatusRequest,
            CardStatus,
            MemoryType,
            CardMemoryResponse,
            CardProductResponse,
            ValentineCardResponse,
            ValentineCardSummary,
            CardMemoryInput,
            CreateValentineCardRequest,
            UpdateValentineCardRequest,
            EventImageResponse,
            EventResponse,
            EventImageInput,
            CreateEventRequest,
            UpdateEventRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin authentication API"),
        (name = "catalog", description = "Categories and products"),
        (name = "coupon", description = "Coupon check API"),
        (name = "shipping", description = "Shipping methods"),
        (name = "order", description = "Checkout and order lookup"),
        (name = "valentine_card", description = "Public valentine cards"),
        (name = "event", description = "Events and gallery"),
        (name = "admin", description = "Back-office API"),
    ),
    info(
        title = "Florist Backend API",
        version = "1.0.0",
        description = "Florist storefront REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_duplicate_endpoint() {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths
                .paths
                .contains_key("/admin/valentine-cards/{id}/duplicate")
        );
        assert!(doc.paths.paths.contains_key("/coupons/check"));
    }
}
