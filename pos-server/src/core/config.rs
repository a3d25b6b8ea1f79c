use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | pos.db | SQLite 文件路径 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SESSION_TTL_MINUTES | 240 | 桌台会话有效期 |
/// | QR_TOKEN_TTL_MINUTES | 43200 | 桌台二维码令牌有效期 |
/// | PUBLIC_BASE_URL | http://localhost:5173 | 扫码点餐前端地址 |
/// | TAX_RATE | 0.10 | 税率 |
/// | BANK_WEBHOOK_API_KEY | (未设置) | 银行回调 API Key，未设置则不校验 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | LOG_LEVEL / LOG_JSON / LOG_DIR | info / false / (未设置) | 日志 |
/// | ADMIN_USERNAME / ADMIN_PASSWORD | admin / admin123 | 首次启动创建的管理员 |
///
/// JWT 相关变量见 [`JwtConfig`]。
///
/// ```ignore
/// DATABASE_PATH=/data/pos.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    pub session_ttl_minutes: i64,
    pub qr_token_ttl_minutes: i64,
    pub public_base_url: String,
    pub tax_rate: f64,
    pub bank_webhook_api_key: Option<String>,
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub admin_username: String,
    pub admin_password: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "pos.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::default(),
            session_ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(240),
            qr_token_ttl_minutes: std::env::var("QR_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(43200),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            tax_rate: std::env::var("TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.10),
            bank_webhook_api_key: std::env::var("BANK_WEBHOOK_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".into()),
        }
    }

    /// 测试配置: 内存数据库、固定 JWT 密钥
    pub fn for_tests() -> Self {
        let mut config = Self::from_env();
        config.database_path = ":memory:".into();
        config.environment = "test".into();
        config.jwt = JwtConfig {
            secret: "test-secret-key-that-is-at-least-32-bytes-long".into(),
            expiration_minutes: 60,
            issuer: "pos-server".into(),
            audience: "pos-staff".into(),
        };
        config.session_ttl_minutes = 240;
        config.qr_token_ttl_minutes = 60;
        config.public_base_url = "http://localhost:5173".into();
        config.tax_rate = 0.10;
        config.bank_webhook_api_key = None;
        config.admin_username = "admin".into();
        config.admin_password = "admin123".into();
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 扫码点餐链接
    pub fn ordering_url(&self, token: &str) -> String {
        format!(
            "{}/order?token={}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_url_strips_trailing_slash() {
        let mut config = Config::for_tests();
        config.public_base_url = "https://menu.example.com/".into();
        assert_eq!(
            config.ordering_url("abc"),
            "https://menu.example.com/order?token=abc"
        );
    }
}
