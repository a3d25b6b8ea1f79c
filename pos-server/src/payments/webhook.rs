//! 银行转账回调对账
//!
//! 每个 provider id 只记录一次 (重放直接返回首次结果)，然后从转账备注中
//! 提取交易号匹配待支付的银行转账记录:
//!
//! | 情况 | 流水状态 | 响应 |
//! |------|----------|------|
//! | 重放 | 不变 | 200 duplicate |
//! | 转出 | IGNORED | 200 |
//! | 备注无有效交易号 / 交易号不存在 | UNMATCHED | 404 |
//! | 非银行转账 / 非 PENDING | REJECTED | 409 |
//! | 金额不符 | AMOUNT_MISMATCH | 400，支付保持 PENDING |
//! | 匹配 | MATCHED | 200，支付 PAID |
//!
//! 不做自动补偿，UNMATCHED / AMOUNT_MISMATCH 留给人工对账。

use shared::models::{
    BankTransferPayload, BankTransferStatus, Payment, PaymentMethod, PaymentStatus, WebhookAck,
};
use shared::transaction_id;

use super::PaymentService;
use crate::auth::session_gate::constant_time_eq;
use crate::db::repository::{RepoError, bank_transfer, payment};
use crate::orders::money::money_eq;
use crate::utils::{AppError, AppResult, ErrorCode};

impl PaymentService {
    pub async fn reconcile_bank_transfer(&self, payload: &BankTransferPayload) -> AppResult<WebhookAck> {
        let now = shared::util::now_millis();

        if !bank_transfer::insert_received(&self.pool, payload, now).await? {
            let seen = bank_transfer::find_by_id(&self.pool, payload.id).await?;
            tracing::info!(provider_id = payload.id, "Duplicate bank transfer ignored");
            return Ok(WebhookAck {
                success: true,
                status: seen.as_ref().map_or(BankTransferStatus::Received, |t| t.status),
                payment_id: seen.and_then(|t| t.payment_id),
                duplicate: true,
            });
        }

        if payload.is_outgoing() {
            bank_transfer::set_outcome(&self.pool, payload.id, BankTransferStatus::Ignored, None)
                .await?;
            return Ok(ack(BankTransferStatus::Ignored, None));
        }

        let Some(target) = self.match_payment(payload).await? else {
            bank_transfer::set_outcome(&self.pool, payload.id, BankTransferStatus::Unmatched, None)
                .await?;
            tracing::warn!(
                target: "reconciliation",
                provider_id = payload.id,
                content = %payload.content,
                amount = payload.transfer_amount,
                "Bank transfer does not reference a known payment"
            );
            return Err(AppError::new(ErrorCode::TransactionIdUnmatched)
                .with_detail("provider_id", payload.id));
        };

        if target.method != PaymentMethod::Banking || target.status != PaymentStatus::Pending {
            return Err(self.reject(payload, &target).await?);
        }

        if !money_eq(payload.transfer_amount, target.total_amount) {
            bank_transfer::set_outcome(
                &self.pool,
                payload.id,
                BankTransferStatus::AmountMismatch,
                Some(target.id),
            )
            .await?;
            tracing::warn!(
                target: "reconciliation",
                provider_id = payload.id,
                payment_id = target.id,
                transaction_id = %target.transaction_id,
                expected = target.total_amount,
                received = payload.transfer_amount,
                "Bank transfer amount mismatch"
            );
            self.emit_failed(
                &target,
                &format!(
                    "Transfer amount {:.2} does not match {:.2}",
                    payload.transfer_amount, target.total_amount
                ),
            )
            .await;
            return Err(AppError::new(ErrorCode::TransferAmountMismatch)
                .with_detail("payment_id", target.id)
                .with_detail("expected", target.total_amount)
                .with_detail("received", payload.transfer_amount));
        }

        // 入账和流水状态同一事务，先写支付拿写锁
        let note = format!("Bank transfer {} via {}", payload.id, payload.gateway);
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let settled = payment::mark_paid_if_pending(&mut *tx, target.id, None, Some(&note), now).await?;
        if !settled {
            drop(tx);
            let latest = self.find(target.id).await?;
            return Err(self.reject(payload, &latest).await?);
        }
        bank_transfer::set_outcome(
            &mut *tx,
            payload.id,
            BankTransferStatus::Matched,
            Some(target.id),
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        let paid = self.find(target.id).await?;
        tracing::info!(
            target: "reconciliation",
            provider_id = payload.id,
            payment_id = paid.id,
            transaction_id = %paid.transaction_id,
            amount = paid.total_amount,
            "Bank transfer matched"
        );
        self.emit_success(&paid).await;
        Ok(ack(BankTransferStatus::Matched, Some(paid.id)))
    }

    /// 网关识别的 `code` 优先，其次备注里的候选交易号；格式校验先于查库
    async fn match_payment(&self, payload: &BankTransferPayload) -> AppResult<Option<Payment>> {
        let mut candidates: Vec<String> = Vec::new();
        if let Some(code) = payload.code.as_deref() {
            let code = code.trim();
            if transaction_id::is_valid(code) {
                candidates.push(code.to_string());
            }
        }
        for found in transaction_id::extract(&payload.content) {
            if !candidates.contains(&found) {
                candidates.push(found);
            }
        }

        for candidate in &candidates {
            if let Some(found) = payment::find_by_transaction_id(&self.pool, candidate).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// 支付存在但不能由转账确认: 记 REJECTED，返回 409
    async fn reject(&self, payload: &BankTransferPayload, target: &Payment) -> AppResult<AppError> {
        bank_transfer::set_outcome(
            &self.pool,
            payload.id,
            BankTransferStatus::Rejected,
            Some(target.id),
        )
        .await?;

        let err = if target.method != PaymentMethod::Banking {
            AppError::new(ErrorCode::PaymentMethodMismatch)
        } else {
            AppError::new(ErrorCode::PaymentNotPending)
        };
        tracing::warn!(
            target: "reconciliation",
            provider_id = payload.id,
            payment_id = target.id,
            method = ?target.method,
            status = ?target.status,
            "Bank transfer rejected"
        );
        Ok(err.with_detail("payment_id", target.id))
    }
}

fn ack(status: BankTransferStatus, payment_id: Option<i64>) -> WebhookAck {
    WebhookAck {
        success: true,
        status,
        payment_id,
        duplicate: false,
    }
}

/// `Authorization: Apikey <key>` 校验，未配置 key 时放行
pub fn verify_api_key(expected: Option<&str>, authorization: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    let Some(supplied) = authorization
        .map(str::trim)
        .and_then(|h| h.strip_prefix("Apikey ").or_else(|| h.strip_prefix("ApiKey ")))
    else {
        return false;
    };
    constant_time_eq(supplied.trim().as_bytes(), expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_not_configured() {
        assert!(verify_api_key(None, None));
        assert!(verify_api_key(None, Some("Apikey whatever")));
    }

    #[test]
    fn test_api_key_checked() {
        let key = Some("s3cr3t-key");
        assert!(verify_api_key(key, Some("Apikey s3cr3t-key")));
        assert!(verify_api_key(key, Some("ApiKey s3cr3t-key")));
        assert!(!verify_api_key(key, Some("Apikey wrong")));
        assert!(!verify_api_key(key, Some("Bearer s3cr3t-key")));
        assert!(!verify_api_key(key, None));
    }
}
