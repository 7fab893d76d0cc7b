use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
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
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// 每个 IP 每分钟允许的注册请求数
    pub register_per_minute: usize,
    /// 仅在可信反向代理之后开启，按转发头识别客户端
    #[serde(default)]
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            register_per_minute: 5,
            trust_proxy: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub default_method: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            default_method: "Razorpay".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 启动时自动创建的管理员账号（不存在时才创建）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let lookup = |name: &str| env::var(name).ok();

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_lookup(&lookup)?,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "Failed to read config file {config_path}: {e}"
                )));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_overrides(&lookup);

        Ok(config)
    }

    pub fn parse(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {e}")))
    }

    /// 无配置文件时使用环境变量与默认值构建
    pub fn from_lookup(get_env: &dyn Fn(&str) -> Option<String>) -> AppResult<Self> {
        fn get_env_parse<T: std::str::FromStr>(
            get_env: &dyn Fn(&str) -> Option<String>,
            name: &str,
            default: T,
        ) -> T {
            get_env(name)
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        // 数据库 URL 在无配置文件时必须提供
        let database_url = get_env("DATABASE_URL").ok_or_else(|| {
            AppError::ConfigError(
                "DATABASE_URL is not set and no config.toml was found".to_string(),
            )
        })?;

        let admin = match (
            get_env("ADMIN_USERNAME"),
            get_env("ADMIN_EMAIL"),
            get_env("ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminConfig {
                username,
                email,
                password,
            }),
            _ => None,
        };

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse(get_env, "SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse(get_env, "DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse(get_env, "JWT_ACCESS_EXPIRES_IN", 7200i64),
                refresh_token_expires_in: get_env_parse(
                    get_env,
                    "JWT_REFRESH_EXPIRES_IN",
                    2_592_000i64,
                ),
            },
            rate_limit: RateLimitConfig {
                register_per_minute: get_env_parse(
                    get_env,
                    "RATE_LIMIT_REGISTER_PER_MINUTE",
                    5usize,
                ),
                trust_proxy: get_env_parse(get_env, "RATE_LIMIT_TRUST_PROXY", false),
            },
            payment: PaymentConfig {
                default_method: get_env("PAYMENT_DEFAULT_METHOD")
                    .unwrap_or_else(|| "Razorpay".to_string()),
            },
            log: LogConfig {
                level: get_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
            admin,
        })
    }

    pub fn apply_overrides(&mut self, get_env: &dyn Fn(&str) -> Option<String>) {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get_env("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Some(v) = get_env("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = get_env("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Some(v) = get_env("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Some(v) = get_env("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Some(v) = get_env("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }
        if let Some(v) = get_env("RATE_LIMIT_REGISTER_PER_MINUTE")
            && let Ok(n) = v.parse()
        {
            self.rate_limit.register_per_minute = n;
        }
        if let Some(v) = get_env("RATE_LIMIT_TRUST_PROXY")
            && let Ok(b) = v.parse()
        {
            self.rate_limit.trust_proxy = b;
        }
        if let Some(v) = get_env("PAYMENT_DEFAULT_METHOD") {
            self.payment.default_method = v;
        }
        if let Some(v) = get_env("LOG_LEVEL") {
            self.log.level = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let lookup = lookup_from(&[("DATABASE_URL", "sqlite::memory:")]);
        let config = Config::from_lookup(&lookup).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.access_token_expires_in, 7200);
        assert_eq!(config.rate_limit.register_per_minute, 5);
        assert!(!config.rate_limit.trust_proxy);
        assert_eq!(config.payment.default_method, "Razorpay");
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_from_lookup_requires_database_url() {
        let lookup = lookup_from(&[]);
        assert!(matches!(
            Config::from_lookup(&lookup),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_parse_and_override() {
        let mut config = Config::parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/nexora"
            max_connections = 5

            [jwt]
            secret = "file-secret"
            access_token_expires_in = 60
            refresh_token_expires_in = 120

            [admin]
            username = "admin"
            email = "admin@nexora.test"
            password = "Admin12345"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.payment.default_method, "Razorpay");
        assert_eq!(config.admin.as_ref().unwrap().username, "admin");

        let lookup = lookup_from(&[("SERVER_PORT", "9100"), ("JWT_SECRET", "env-secret")]);
        config.apply_overrides(&lookup);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.jwt.secret, "env-secret");
        assert_eq!(config.database.max_connections, 5);
    }
}
