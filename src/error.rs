use actix_web::{HttpResponse, ResponseError};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// 优惠码校验失败原因（按校验顺序排列）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    #[error("Coupon code is required")]
    MissingCode,

    #[error("Coupon not found")]
    NotFound,

    #[error("Coupon is disabled")]
    Disabled,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon usage limit reached")]
    LimitReached,

    #[error("Minimum spend of {min_spend} not reached")]
    BelowMinSpend { min_spend: Decimal },
}

impl CouponRejection {
    pub fn code(&self) -> &'static str {
        match self {
            CouponRejection::MissingCode => "COUPON_MISSING_CODE",
            CouponRejection::NotFound => "COUPON_NOT_FOUND",
            CouponRejection::Disabled => "COUPON_DISABLED",
            CouponRejection::Expired => "COUPON_EXPIRED",
            CouponRejection::LimitReached => "COUPON_LIMIT_REACHED",
            CouponRejection::BelowMinSpend { .. } => "COUPON_BELOW_MIN_SPEND",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Coupon rejected: {0}")]
    Coupon(#[from] CouponRejection),

    #[error("Could not allocate a unique slug after {attempts} attempts")]
    SlugSpaceExhausted { attempts: u32 },

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::Conflict(msg) => {
                log::warn!("Conflict: {msg}");
                (actix_web::http::StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Coupon(rejection) => {
                log::warn!("Coupon rejected: {rejection}");
                let status = match rejection {
                    CouponRejection::NotFound => actix_web::http::StatusCode::NOT_FOUND,
                    _ => actix_web::http::StatusCode::BAD_REQUEST,
                };
                (status, rejection.code(), rejection.to_string())
            }
            AppError::SlugSpaceExhausted { attempts } => {
                log::error!("Slug allocation exhausted after {attempts} attempts");
                (
                    actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                    "SLUG_SPACE_EXHAUSTED",
                    "Could not allocate a unique link, please retry".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        });
        // 未达最低消费时附带门槛金额，方便前端提示
        if let AppError::Coupon(CouponRejection::BelowMinSpend { min_spend }) = self {
            body["error"]["min_spend"] = json!(min_spend);
        }

        HttpResponse::build(status_code).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_coupon_rejection_status_codes() {
        let not_found = AppError::Coupon(CouponRejection::NotFound).error_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let expired = AppError::Coupon(CouponRejection::Expired).error_response();
        assert_eq!(expired.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_slug_exhaustion_is_service_unavailable() {
        let resp = AppError::SlugSpaceExhausted { attempts: 20 }.error_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_database_error_is_opaque() {
        let resp = AppError::DatabaseError(sea_orm::DbErr::Custom("boom".into())).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_internal_error_hides_details() {
        let resp = AppError::InternalError("hash failed: cost".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
