use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;

/// 后台管理员登录，账号来自配置文件
#[derive(Clone)]
pub struct AuthService {
    admin: AdminConfig,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(admin: AdminConfig, jwt_service: JwtService) -> Self {
        Self { admin, jwt_service }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let username = request.username.trim();
        // 用户名错误与密码错误返回相同提示
        let password_ok = !self.admin.password_hash.is_empty()
            && verify_password(&request.password, &self.admin.password_hash)?;
        if username != self.admin.username || !password_ok {
            log::warn!("Failed admin login for {username}");
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let access_token = self.jwt_service.generate_access_token(username)?;
        log::info!("Admin {username} logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let admin = AdminConfig {
            username: "owner".to_string(),
            password_hash: hash_password("bloom2026").unwrap(),
        };
        AuthService::new(admin, JwtService::new("test-secret", 3600))
    }

    #[tokio::test]
    async fn test_login_success() {
        let svc = service();
        let resp = svc
            .login(LoginRequest {
                username: "owner".to_string(),
                password: "bloom2026".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.expires_in, 3600);

        let claims = svc.jwt_service.verify_access_token(&resp.access_token).unwrap();
        assert_eq!(claims.sub, "owner");
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let svc = service();
        for (username, password) in [("owner", "wrong"), ("someone", "bloom2026")] {
            let err = svc
                .login(LoginRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::AuthError(_)));
        }
    }
}
