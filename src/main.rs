use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use florist_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    store::SeaOrmStore,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);

    // 优惠码校验与卡片复制共用同一个存储
    let store = Arc::new(SeaOrmStore::new(pool.clone()));
    let evaluator = CouponEvaluator::new(store.clone(), config.shop.currency_scale);
    let cloner = CardCloner::new(
        store.clone(),
        Arc::new(RandomSlugs::new(config.shop.slug_length)),
        config.shop.slug_max_attempts,
    );

    // 创建服务
    let auth_service = AuthService::new(config.admin.clone(), jwt_service.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let coupon_service = CouponService::new(pool.clone(), evaluator.clone());
    let shipping_service = ShippingService::new(pool.clone());
    let order_service = OrderService::new(pool.clone(), evaluator, config.shop.clone());
    let card_service = ValentineCardService::new(pool.clone(), store, cloner);
    let event_service = EventService::new(pool.clone());

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{} (currency {})",
        config.server.host,
        config.server.port,
        config.shop.currency
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(coupon_service.clone()))
            .app_data(web::Data::new(shipping_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(card_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::catalog_config)
                    .configure(handlers::coupon_config)
                    .configure(handlers::shipping_config)
                    .configure(handlers::order_config)
                    .configure(handlers::valentine_card_config)
                    .configure(handlers::event_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
