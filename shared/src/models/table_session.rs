//! Table Session Model

use crate::lifecycle::StatusMachine;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 桌台会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SessionStatus {
    Open,
    Closed,
}

impl StatusMachine for SessionStatus {
    const ENTITY: &'static str = "session";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    fn allowed_next(&self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::Closed],
            Self::Closed => &[],
        }
    }
}

/// Table session entity (一次就餐会话)
///
/// `secret_hash` 是会话密钥的 SHA-256，明文只在 init 时返回一次。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableSession {
    pub id: i64,
    pub table_id: i64,
    #[serde(skip_serializing, default)]
    pub secret_hash: String,
    pub customer_count: Option<i32>,
    pub notes: Option<String>,
    pub status: SessionStatus,
    pub created_at: i64,
    pub expires_at: i64,
    pub closed_at: Option<i64>,
}

impl TableSession {
    /// OPEN and not yet expired
    pub fn is_active(&self, now: i64) -> bool {
        self.status == SessionStatus::Open && self.expires_at > now
    }
}

/// Session plus its table name, for staff listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableSessionDetail {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    #[serde(flatten)]
    pub session: TableSession,
    pub table_name: String,
}

/// Guest request to open a session from a QR token
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionInit {
    #[validate(length(min = 1, max = 2048))]
    pub token: String,
    #[validate(range(min = 1, max = 100))]
    pub customer_count: Option<i32>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Session init response: the plaintext secret is returned exactly once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInitResponse {
    pub session: TableSession,
    pub table_name: String,
    pub secret: String,
}

/// Staff partial update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SessionUpdate {
    #[validate(range(min = 1, max = 100))]
    pub customer_count: Option<i32>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    pub status: Option<SessionStatus>,
}

/// Close request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SessionClose {
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Session list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub table_id: Option<i64>,
}

/// Identity resolved by the session gate for guest requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSession {
    pub session_id: i64,
    pub table_id: i64,
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_to_closed_only() {
        assert!(SessionStatus::Open.can_transition_to(SessionStatus::Closed));
        assert!(!SessionStatus::Open.can_transition_to(SessionStatus::Open));
        assert!(!SessionStatus::Closed.can_transition_to(SessionStatus::Open));
        assert!(SessionStatus::Closed.is_terminal());
    }

    #[test]
    fn test_closed_reopen_error() {
        let err = SessionStatus::Closed
            .transition_to(SessionStatus::Open)
            .unwrap_err();
        assert_eq!(err.from, "CLOSED");
        assert_eq!(err.to, "OPEN");
    }

    #[test]
    fn test_secret_hash_not_serialized() {
        let session = TableSession {
            id: 1,
            table_id: 5,
            secret_hash: "abc".into(),
            customer_count: Some(2),
            notes: None,
            status: SessionStatus::Open,
            created_at: 0,
            expires_at: 10,
            closed_at: None,
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(json.contains("\"status\":\"OPEN\""));
        assert!(session.is_active(5));
        assert!(!session.is_active(10));
    }
}
