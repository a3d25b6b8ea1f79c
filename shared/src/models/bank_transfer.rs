//! Bank Transfer Model
//!
//! Inbound transfer notifications posted by the bank gateway. Every received
//! provider id is recorded once, which gives idempotency and an audit trail
//! for manual reconciliation.

use serde::{Deserialize, Serialize};

/// Gateway webhook body (camelCase on the wire)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankTransferPayload {
    /// Provider transaction id
    pub id: i64,
    pub gateway: String,
    pub transaction_date: String,
    pub account_number: String,
    /// Payment code detected by the gateway, if any
    pub code: Option<String>,
    /// Transfer memo, carries our transaction id
    pub content: String,
    /// "in" or "out"
    pub transfer_type: String,
    pub transfer_amount: f64,
    #[serde(default)]
    pub accumulated: f64,
    pub sub_account: Option<String>,
    pub reference_code: Option<String>,
}

impl BankTransferPayload {
    pub fn is_outgoing(&self) -> bool {
        self.transfer_type.eq_ignore_ascii_case("out")
    }
}

/// Reconciliation outcome of a received transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum BankTransferStatus {
    /// Received, not yet reconciled
    Received,
    Matched,
    Unmatched,
    AmountMismatch,
    /// Payment exists but is not a pending bank payment
    Rejected,
    /// Outgoing transfer
    Ignored,
}

/// Recorded transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BankTransfer {
    pub id: i64,
    pub gateway: String,
    pub transaction_date: String,
    pub account_number: String,
    pub payment_code: Option<String>,
    pub content: String,
    pub transfer_type: String,
    pub amount: f64,
    pub accumulated: f64,
    pub sub_account: Option<String>,
    pub reference_code: Option<String>,
    pub status: BankTransferStatus,
    pub payment_id: Option<i64>,
    pub received_at: i64,
}

/// Webhook acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    pub status: BankTransferStatus,
    pub payment_id: Option<i64>,
    /// True when this provider id was seen before
    #[serde(default)]
    pub duplicate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_camel_case() {
        let json = r#"{
            "id": 92704,
            "gateway": "Vietcombank",
            "transactionDate": "2024-07-02 11:44:23",
            "accountNumber": "0123499999",
            "code": null,
            "content": "chuyen tien TXABCDEFGH23",
            "transferType": "in",
            "transferAmount": 110000,
            "accumulated": 19077000,
            "subAccount": null,
            "referenceCode": "MBVCB.3278907687"
        }"#;
        let payload: BankTransferPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.id, 92704);
        assert_eq!(payload.transfer_amount, 110000.0);
        assert!(!payload.is_outgoing());
    }
}
