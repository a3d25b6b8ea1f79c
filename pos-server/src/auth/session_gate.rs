//! 桌台会话网关
//!
//! 顾客扫码点餐请求不带员工令牌，而是携带开台时返回的会话凭证:
//!
//! | Header | 内容 |
//! |--------|------|
//! | `x-session-id` | 会话 ID |
//! | `x-session-secret` | 会话密钥 (明文，仅 init 时返回一次) |
//!
//! 校验通过后把 [`GuestSession`] 注入请求扩展。网关只读，不清理过期会话。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use shared::models::{GuestSession, SessionStatus};

use crate::core::ServerState;
use crate::db::repository::table_session;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

pub const SESSION_ID_HEADER: &str = "x-session-id";
pub const SESSION_SECRET_HEADER: &str = "x-session-secret";

/// 32 字节随机密钥 (hex)
pub fn generate_session_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex，数据库只保存哈希
pub fn hash_session_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// 常量时间比较
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn verify_session_secret(secret: &str, stored_hash: &str) -> bool {
    constant_time_eq(
        hash_session_secret(secret).as_bytes(),
        stored_hash.as_bytes(),
    )
}

/// 拷贝为 owned，避免跨 await 持有请求借用
fn header_value(req: &Request, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// 会话网关中间件
///
/// | 情况 | 错误 |
/// |------|------|
/// | 缺少凭证头 | 401 SessionCredentialsMissing |
/// | 会话不存在 / 密钥不符 / 已关闭 | 401 SessionCredentialsInvalid |
/// | 已过期 | 401 SessionExpired |
pub async fn require_table_session(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (Some(raw_id), Some(secret)) = (
        header_value(&req, SESSION_ID_HEADER),
        header_value(&req, SESSION_SECRET_HEADER),
    ) else {
        security_log!(WARN, "session_credentials_missing", uri = %req.uri());
        return Err(AppError::new(ErrorCode::SessionCredentialsMissing));
    };

    let invalid = || AppError::new(ErrorCode::SessionCredentialsInvalid);

    let session_id: i64 = raw_id.parse().map_err(|_| invalid())?;
    let session = table_session::find_by_id(&state.pool, session_id)
        .await?
        .ok_or_else(invalid)?;

    if !verify_session_secret(&secret, &session.secret_hash) {
        security_log!(WARN, "session_secret_mismatch", session_id = session_id);
        return Err(invalid());
    }

    if session.status != SessionStatus::Open {
        return Err(AppError::with_message(
            ErrorCode::SessionCredentialsInvalid,
            "Session is closed",
        ));
    }

    if session.expires_at <= shared::util::now_millis() {
        return Err(AppError::new(ErrorCode::SessionExpired));
    }

    req.extensions_mut().insert(GuestSession {
        session_id: session.id,
        table_id: session.table_id,
        expires_at: session.expires_at,
    });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_hash_roundtrip() {
        let secret = generate_session_secret();
        assert_eq!(secret.len(), 64);
        let hash = hash_session_secret(&secret);
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, secret);
        assert!(verify_session_secret(&secret, &hash));
        assert!(!verify_session_secret("wrong", &hash));
    }

    #[test]
    fn test_secrets_are_random() {
        assert_ne!(generate_session_secret(), generate_session_secret());
    }
}
