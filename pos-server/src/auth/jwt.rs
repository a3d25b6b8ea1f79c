//! JWT 令牌服务
//!
//! 员工访问令牌 (`token_type = "access"`) 与桌台二维码令牌
//! (`token_type = "table_qr"`) 使用同一把 HS256 密钥签发。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const TABLE_QR_TOKEN_TYPE: &str = "table_qr";

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (应至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                tracing::error!("JWT_SECRET must be at least 32 characters long, using a temporary key");
                generate_printable_secret()
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set! Generating temporary key, tokens will not survive restarts.");
                generate_printable_secret()
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 默认 24 小时
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "pos-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "pos-staff".to_string()),
        }
    }
}

/// 生成可打印的随机 JWT 密钥 (64 字符)
pub fn generate_printable_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| ALLOWED[rng.gen_range(0..ALLOWED.len())] as char)
        .collect()
}

/// 员工令牌 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 角色名称
    pub role: String,
    /// 权限列表 (逗号分隔)
    pub permissions: String,
    /// 令牌类型
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// 桌台二维码令牌 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableQrClaims {
    /// `table:<id>`
    pub sub: String,
    pub table_id: i64,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌类型错误: {0}")]
    WrongTokenType(String),

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation.leeway = 0;
        validation
    }

    fn map_decode_error(e: jsonwebtoken::errors::Error) -> JwtError {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            _ => JwtError::InvalidToken(e.to_string()),
        }
    }

    /// 为员工生成访问令牌
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        role: &str,
        permissions: &[String],
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            permissions: permissions.join(","),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码员工令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map_err(Self::map_decode_error)?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(JwtError::WrongTokenType(token_data.claims.token_type));
        }
        Ok(token_data.claims)
    }

    /// 签发桌台二维码令牌，返回 (token, 过期时间毫秒)
    pub fn generate_table_qr_token(
        &self,
        table_id: i64,
        ttl_minutes: i64,
    ) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(ttl_minutes);

        let claims = TableQrClaims {
            sub: format!("table:{table_id}"),
            table_id,
            token_type: TABLE_QR_TOKEN_TYPE.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;
        Ok((token, expiration.timestamp_millis()))
    }

    /// 验证桌台二维码令牌
    pub fn validate_table_qr_token(&self, token: &str) -> Result<TableQrClaims, JwtError> {
        let token_data = decode::<TableQrClaims>(token, &self.decoding_key, &self.validation())
            .map_err(Self::map_decode_error)?;

        if token_data.claims.token_type != TABLE_QR_TOKEN_TYPE {
            return Err(JwtError::WrongTokenType(token_data.claims.token_type));
        }
        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// 获取距离过期的剩余秒数
    pub fn get_expiration_seconds(&self, claims: &Claims) -> i64 {
        let now = Utc::now().timestamp();
        (claims.exp - now).max(0)
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建并注入请求扩展，处理器通过提取器获取后显式传给服务层。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    /// 角色名称
    pub role: String,
    pub permissions: Vec<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidToken(format!("invalid subject: {}", claims.sub)))?;

        let permissions = if claims.permissions.is_empty() {
            vec![]
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.to_string())
                .collect()
        };

        Ok(Self {
            id,
            username: claims.username,
            role: claims.role,
            permissions,
        })
    }
}

impl CurrentUser {
    /// 管理员角色 (`role == "admin"`) 拥有所有权限
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// 检查是否拥有指定权限
    ///
    /// 1. 管理员拥有所有权限
    /// 2. 权限列表包含 `"all"` 则拥有所有权限
    /// 3. 精确匹配或前缀匹配 (`"orders:*"` 匹配 `"orders:manage"`)
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_admin() {
            return true;
        }

        if self.permissions.iter().any(|p| p == "all") {
            return true;
        }

        self.permissions.iter().any(|p| {
            if p == permission {
                return true;
            }
            match p.strip_suffix(":*") {
                Some(prefix) => permission
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(':')),
                None => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "unit-test-secret-key-with-32-plus-bytes".into(),
            expiration_minutes: 60,
            issuer: "pos-server".into(),
            audience: "pos-staff".into(),
        })
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = service();
        let permissions = vec!["orders:read".to_string(), "orders:manage".to_string()];

        let token = service
            .generate_token(42, "john_doe", "cashier", &permissions)
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "cashier");
        assert_eq!(claims.permissions, "orders:read,orders:manage");

        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.permissions.len(), 2);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().generate_token(1, "a", "staff", &[]).unwrap();
        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret-key-with-32-plus-bytes!!".into(),
            ..service().config
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_table_qr_token() {
        let service = service();
        let (token, expires_at) = service.generate_table_qr_token(5, 10).unwrap();
        assert!(expires_at > Utc::now().timestamp_millis());

        let claims = service.validate_table_qr_token(&token).unwrap();
        assert_eq!(claims.table_id, 5);
        assert_eq!(claims.sub, "table:5");

        // QR token is not an access token
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_qr_token() {
        let service = service();
        let (token, _) = service.generate_table_qr_token(5, -5).unwrap();
        assert!(matches!(
            service.validate_table_qr_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_current_user_permissions() {
        let user = CurrentUser {
            id: 1,
            username: "john".to_string(),
            role: "waiter".to_string(),
            permissions: vec!["orders:read".to_string(), "kitchen:*".to_string()],
        };

        assert!(user.has_permission("orders:read"));
        assert!(user.has_permission("kitchen:manage"));
        assert!(!user.has_permission("kitchenette:manage"));
        assert!(!user.has_permission("payments:refund"));
    }

    #[test]
    fn test_admin_has_all_permissions() {
        let admin = CurrentUser {
            id: 1,
            username: "admin".to_string(),
            role: "admin".to_string(),
            permissions: vec![],
        };

        assert!(admin.has_permission("payments:refund"));
        assert!(admin.has_permission("users:manage"));
        assert!(admin.is_admin());
    }
}
