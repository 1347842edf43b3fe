use anyhow::{Context, anyhow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub shop: ShopConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

/// 后台管理员账号，password_hash 为 bcrypt 哈希
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password_hash: String,
}

/// 店铺业务参数，显式传入各个 service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// 最小货币单位的小数位数 (0 = 整数金额)
    #[serde(default)]
    pub currency_scale: u32,
    #[serde(default = "default_slug_length")]
    pub slug_length: usize,
    #[serde(default = "default_slug_max_attempts")]
    pub slug_max_attempts: u32,
    /// 折后小计达到该金额免运费 (None = 不免)
    #[serde(default)]
    pub free_shipping_threshold: Option<Decimal>,
}

fn default_currency() -> String {
    "THB".to_string()
}

fn default_slug_length() -> usize {
    6
}

fn default_slug_max_attempts() -> u32 {
    20
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            currency_scale: 0,
            slug_length: default_slug_length(),
            slug_max_attempts: default_slug_max_attempts(),
            free_shipping_threshold: None,
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str)
                    .with_context(|| format!("解析配置文件失败: {config_path}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow!("缺少 DATABASE_URL 环境变量，且未找到配置文件 {config_path}")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                    },
                    admin: AdminConfig {
                        username: get_env("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
                        password_hash: get_env("ADMIN_PASSWORD_HASH").unwrap_or_default(),
                    },
                    shop: ShopConfig::default(),
                }
            }
            Err(e) => {
                return Err(anyhow!("无法读取配置文件 {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("ADMIN_USERNAME") {
            config.admin.username = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD_HASH") {
            config.admin.password_hash = v;
        }

        // Shop
        if let Ok(v) = env::var("SHOP_CURRENCY") {
            config.shop.currency = v;
        }
        if let Ok(v) = env::var("SHOP_CURRENCY_SCALE")
            && let Ok(n) = v.parse()
        {
            config.shop.currency_scale = n;
        }
        if let Ok(v) = env::var("SHOP_SLUG_LENGTH")
            && let Ok(n) = v.parse()
        {
            config.shop.slug_length = n;
        }
        if let Ok(v) = env::var("SHOP_SLUG_MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            config.shop.slug_max_attempts = n;
        }
        if let Ok(v) = env::var("SHOP_FREE_SHIPPING_THRESHOLD")
            && let Ok(d) = v.parse()
        {
            config.shop.free_shipping_threshold = Some(d);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.shop.slug_length == 0 {
            return Err(anyhow!("shop.slug_length 必须大于 0"));
        }
        if self.shop.slug_max_attempts == 0 {
            return Err(anyhow!("shop.slug_max_attempts 必须大于 0"));
        }
        if self.admin.password_hash.is_empty() {
            log::warn!("admin.password_hash is empty, admin login is disabled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_with_default_shop() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/florist"
            max_connections = 5

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 3600

            [admin]
            username = "owner"
            password_hash = "$2b$12$abc"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.shop.slug_length, 6);
        assert_eq!(config.shop.slug_max_attempts, 20);
        assert_eq!(config.shop.currency_scale, 0);
        assert!(config.shop.free_shipping_threshold.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_shop_overrides() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/florist"
            max_connections = 10

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 3600

            [admin]
            username = "owner"
            password_hash = "$2b$12$abc"

            [shop]
            currency = "USD"
            currency_scale = 2
            slug_length = 8
            slug_max_attempts = 5
            free_shipping_threshold = "1500"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.shop.currency, "USD");
        assert_eq!(config.shop.currency_scale, 2);
        assert_eq!(config.shop.slug_length, 8);
        assert_eq!(
            config.shop.free_shipping_threshold,
            Some(Decimal::new(1500, 0))
        );
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut shop = ShopConfig::default();
        shop.slug_max_attempts = 0;
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/florist".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "s".to_string(),
                access_token_expires_in: 60,
            },
            admin: AdminConfig {
                username: "admin".to_string(),
                password_hash: "x".to_string(),
            },
            shop,
        };
        assert!(config.validate().is_err());
    }
}
