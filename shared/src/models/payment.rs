//! Payment Model

use crate::lifecycle::StatusMachine;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Cash,
    Card,
    /// 银行转账，由 webhook 或人工对账确认
    Banking,
}

/// 支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl StatusMachine for PaymentStatus {
    const ENTITY: &'static str = "payment";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
        }
    }

    fn allowed_next(&self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Paid, Self::Failed],
            Self::Paid => &[Self::Refunded],
            Self::Failed | Self::Refunded => &[],
        }
    }
}

/// Payment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub session_id: Option<i64>,
    pub order_id: Option<i64>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// `TX` + 10 symbols, printed on the transfer memo for bank payments
    pub transaction_id: String,
    pub notes: Option<String>,
    pub refund_reason: Option<String>,
    pub processed_by: Option<i64>,
    pub created_at: i64,
    pub paid_at: Option<i64>,
    pub refunded_at: Option<i64>,
}

/// Create payment payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentCreate {
    pub session_id: Option<i64>,
    pub order_id: Option<i64>,
    #[validate(range(min = 0.0))]
    pub subtotal: f64,
    #[validate(range(min = 0.0))]
    pub tax: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub discount: f64,
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
    pub method: PaymentMethod,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Process (mark paid) payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PaymentProcess {
    /// Required for BANKING: must equal the payment's own transaction id
    #[validate(length(max = 64))]
    pub transaction_id: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Refund payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentRefund {
    #[validate(length(max = 500))]
    pub reason: String,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Mark-failed payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PaymentFail {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Payment list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub session_id: Option<i64>,
    pub order_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_edges() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Refunded.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Failed.is_terminal());
    }

    #[test]
    fn test_method_serde() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Banking).unwrap(),
            "\"BANKING\""
        );
    }
}
