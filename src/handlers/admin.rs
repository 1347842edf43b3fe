use actix_web::web;

use super::auth::auth_admin_config;
use super::catalog::catalog_admin_config;
use super::coupon::coupon_admin_config;
use super::event::event_admin_config;
use super::order::order_admin_config;
use super::shipping::shipping_admin_config;
use super::valentine_card::valentine_card_admin_config;

/// 后台接口统一挂在 /admin 下，由 AuthMiddleware 校验令牌
pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .configure(auth_admin_config)
            .configure(catalog_admin_config)
            .configure(coupon_admin_config)
            .configure(shipping_admin_config)
            .configure(order_admin_config)
            .configure(valentine_card_admin_config)
            .configure(event_admin_config),
    );
}
