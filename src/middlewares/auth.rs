use crate::error::AppError;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// 需要管理员令牌的路径
struct ProtectedPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl ProtectedPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/api/v1/admin"],
            // 前缀必须以 / 结尾，避免误伤 /api/v1/administrator
            prefix_paths: vec!["/api/v1/admin/"],
        }
    }

    fn is_protected(&self, path: &str) -> bool {
        self.exact_paths.contains(&path)
            || self
                .prefix_paths
                .iter()
                .any(|&prefix| path.starts_with(prefix))
    }
}

/// 已通过认证的管理员 (JWT sub)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity(pub String);

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            protected_paths: ProtectedPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    protected_paths: ProtectedPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        // 店铺前台接口全部公开
        if !self.protected_paths.is_protected(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        match token {
            Some(token) => match self.jwt_service.verify_access_token(&token) {
                Ok(claims) => {
                    req.extensions_mut().insert(AdminIdentity(claims.sub));
                    Box::pin(self.service.call(req))
                }
                Err(_) => {
                    let error = AppError::AuthError("Invalid access token".to_string());
                    Box::pin(async move { Err(error.into()) })
                }
            },
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 当前管理员用户名
pub fn current_admin(req: &HttpRequest) -> Option<String> {
    req.extensions().get::<AdminIdentity>().map(|a| a.0.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test, web};

    #[test]
    fn test_protected_paths() {
        let paths = ProtectedPaths::new();
        assert!(paths.is_protected("/api/v1/admin"));
        assert!(paths.is_protected("/api/v1/admin/coupons"));
        assert!(paths.is_protected("/api/v1/admin/valentine-cards/3/duplicate"));
        assert!(!paths.is_protected("/api/v1/administrator"));
        assert!(!paths.is_protected("/api/v1/coupons/check"));
        assert!(!paths.is_protected("/api/v1/auth/login"));
        assert!(!paths.is_protected("/swagger-ui/"));
    }

    #[actix_web::test]
    async fn test_lookalike_admin_path_stays_public() {
        let jwt = JwtService::new("test-secret", 3600);
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .route("/api/v1/administrator", web::get().to(whoami))
                .route("/api/v1/admin", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/administrator")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = actix_test::TestRequest::get().uri("/api/v1/admin").to_request();
        let err = actix_test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }

    async fn whoami(req: HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body(current_admin(&req).unwrap_or_default())
    }

    #[actix_web::test]
    async fn test_admin_routes_require_token() {
        let jwt = JwtService::new("test-secret", 3600);
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone()))
                .route("/api/v1/admin/me", web::get().to(whoami))
                .route("/api/v1/shipping-methods", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/v1/shipping-methods").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = actix_test::TestRequest::get().uri("/api/v1/admin/me").to_request();
        let err = actix_test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );

        let token = jwt.generate_access_token("owner").unwrap();
        let req = actix_test::TestRequest::get()
            .uri("/api/v1/admin/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert_eq!(body, "owner");
    }
}
