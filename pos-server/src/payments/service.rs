use serde_json::json;
use shared::lifecycle::StatusMachine;
use shared::models::{
    BankTransfer, BankTransferStatus, NotificationType, Payment, PaymentCreate, PaymentFilter,
    PaymentMethod, PaymentProcess, PaymentStatus,
};
use shared::pagination::{PageQuery, PaginatedResponse};
use shared::transaction_id;
use sqlx::SqlitePool;

use crate::audit_log;
use crate::db::repository::payment::{self, NewPayment};
use crate::db::repository::{RepoError, bank_transfer, order, table_session};
use crate::notifications::NotificationService;
use crate::orders::money::{is_total_consistent, to_decimal, to_f64, validate_amount};
use crate::utils::validation::{MAX_NOTE_LEN, normalize_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// 交易号碰撞时的重试次数
const TRANSACTION_ID_ATTEMPTS: usize = 5;

/// 支付服务
///
/// 所有状态变化都是条件 UPDATE (`WHERE status = ...`)，
/// 并发的第二个调用者看到 `rows_affected == 0`，不会重复入账。
#[derive(Clone, Debug)]
pub struct PaymentService {
    pub(super) pool: SqlitePool,
    pub(super) notifications: NotificationService,
}

impl PaymentService {
    pub fn new(pool: SqlitePool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// 创建待支付记录
    ///
    /// `total_amount` 必须等于 `subtotal + tax − discount`。
    pub async fn create_payment(&self, input: PaymentCreate, created_by: Option<i64>) -> AppResult<Payment> {
        if input.session_id.is_none() && input.order_id.is_none() {
            return Err(AppError::new(ErrorCode::PaymentTargetRequired));
        }

        validate_amount(input.subtotal, "subtotal")?;
        validate_amount(input.tax, "tax")?;
        validate_amount(input.discount, "discount")?;
        validate_amount(input.total_amount, "total_amount")?;
        if !is_total_consistent(input.subtotal, input.tax, input.discount, input.total_amount) {
            let expected =
                to_decimal(input.subtotal) + to_decimal(input.tax) - to_decimal(input.discount);
            return Err(AppError::new(ErrorCode::PaymentAmountMismatch)
                .with_detail("expected_total", to_f64(expected))
                .with_detail("total_amount", input.total_amount));
        }

        self.check_targets(input.session_id, input.order_id).await?;

        let notes = normalize_optional_text(input.notes);
        let now = shared::util::now_millis();

        for attempt in 1..=TRANSACTION_ID_ATTEMPTS {
            let tx_id = transaction_id::generate();
            let result = payment::insert(
                &self.pool,
                NewPayment {
                    session_id: input.session_id,
                    order_id: input.order_id,
                    subtotal: input.subtotal,
                    tax: input.tax,
                    discount: input.discount,
                    total_amount: input.total_amount,
                    method: input.method,
                    transaction_id: &tx_id,
                    notes: notes.as_deref(),
                    processed_by: created_by,
                    now,
                },
            )
            .await;

            match result {
                Ok(created) => {
                    tracing::info!(
                        payment_id = created.id,
                        transaction_id = %created.transaction_id,
                        method = ?created.method,
                        total = created.total_amount,
                        "Payment created"
                    );
                    return Ok(created);
                }
                Err(RepoError::Duplicate(_)) => {
                    tracing::warn!(attempt, "Transaction id collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal("Failed to allocate a unique transaction id"))
    }

    async fn check_targets(&self, session_id: Option<i64>, order_id: Option<i64>) -> AppResult<()> {
        if let Some(session_id) = session_id {
            table_session::find_by_id(&self.pool, session_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;
        }
        if let Some(order_id) = order_id {
            let found = order::find_by_id(&self.pool, order_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
            if session_id.is_some() && found.session_id != session_id {
                return Err(AppError::invalid_request("Order does not belong to the session")
                    .with_detail("order_id", order_id));
            }
        }
        Ok(())
    }

    /// 确认收款 PENDING → PAID
    ///
    /// 现金/刷卡直接确认；银行转账人工对账时必须提供与记录一致的交易号。
    pub async fn process_payment(
        &self,
        id: i64,
        input: PaymentProcess,
        processed_by: Option<i64>,
    ) -> AppResult<Payment> {
        let current = self.find(id).await?;
        if current.status != PaymentStatus::Pending {
            return Err(AppError::new(ErrorCode::PaymentNotPending)
                .with_detail("status", current.status.as_str()));
        }

        if current.method == PaymentMethod::Banking {
            let supplied = input
                .transaction_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::TransactionIdInvalid,
                        "Transaction id is required to confirm a bank transfer",
                    )
                })?;
            if !transaction_id::is_valid(supplied) {
                return Err(AppError::new(ErrorCode::TransactionIdInvalid));
            }
            if supplied != current.transaction_id {
                return Err(AppError::new(ErrorCode::TransactionIdUnmatched));
            }
        }

        let notes = normalize_optional_text(input.notes);
        let now = shared::util::now_millis();
        if !payment::mark_paid_if_pending(&self.pool, id, processed_by, notes.as_deref(), now).await? {
            return Err(AppError::new(ErrorCode::PaymentNotPending));
        }

        let paid = self.find(id).await?;
        if let Some(user_id) = processed_by {
            audit_log!(user_id, "payment_paid", format!("payment:{id}"), paid.transaction_id);
        }
        self.emit_success(&paid).await;
        Ok(paid)
    }

    /// 退款 PAID → REFUNDED，必须填写原因
    pub async fn refund_payment(
        &self,
        id: i64,
        reason: &str,
        notes: Option<String>,
        processed_by: i64,
    ) -> AppResult<Payment> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::new(ErrorCode::RefundReasonRequired));
        }
        validate_required_text(reason, "reason", MAX_NOTE_LEN)?;

        let current = self.find(id).await?;
        if current.status != PaymentStatus::Paid {
            return Err(AppError::new(ErrorCode::PaymentNotPaid));
        }

        let notes = normalize_optional_text(notes);
        let now = shared::util::now_millis();
        if !payment::refund_if_paid(&self.pool, id, reason, notes.as_deref(), processed_by, now).await? {
            return Err(AppError::new(ErrorCode::PaymentNotPaid));
        }

        audit_log!(processed_by, "payment_refunded", format!("payment:{id}"), reason);
        self.find(id).await
    }

    /// 标记失败 PENDING → FAILED
    pub async fn fail_payment(
        &self,
        id: i64,
        reason: Option<String>,
        processed_by: Option<i64>,
    ) -> AppResult<Payment> {
        let current = self.find(id).await?;
        if current.status != PaymentStatus::Pending {
            return Err(AppError::new(ErrorCode::PaymentNotPending));
        }

        let reason = normalize_optional_text(reason);
        if !payment::mark_failed_if_pending(&self.pool, id, processed_by, reason.as_deref()).await? {
            return Err(AppError::new(ErrorCode::PaymentNotPending));
        }

        let failed = self.find(id).await?;
        self.emit_failed(&failed, reason.as_deref().unwrap_or("Marked as failed by staff"))
            .await;
        Ok(failed)
    }

    pub async fn get(&self, id: i64) -> AppResult<Payment> {
        self.find(id).await
    }

    pub async fn list(
        &self,
        filter: &PaymentFilter,
        page: &PageQuery,
    ) -> AppResult<PaginatedResponse<Payment>> {
        let (rows, total) = payment::find_page(&self.pool, filter, page).await?;
        Ok(PaginatedResponse::from_query(rows, total, page))
    }

    /// 银行回调流水 (人工对账用)
    pub async fn list_bank_transfers(
        &self,
        status: Option<BankTransferStatus>,
        page: &PageQuery,
    ) -> AppResult<PaginatedResponse<BankTransfer>> {
        let (rows, total) = bank_transfer::find_page(&self.pool, status, page).await?;
        Ok(PaginatedResponse::from_query(rows, total, page))
    }

    pub(super) async fn find(&self, id: i64) -> AppResult<Payment> {
        payment::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::PaymentNotFound))
    }

    pub(super) async fn emit_success(&self, paid: &Payment) {
        self.notifications
            .emit(
                NotificationType::PaymentSuccess,
                "Payment received",
                &format!("{} paid {:.2}", paid.transaction_id, paid.total_amount),
                json!({
                    "payment_id": paid.id,
                    "transaction_id": paid.transaction_id,
                    "session_id": paid.session_id,
                    "order_id": paid.order_id,
                    "amount": paid.total_amount,
                    "method": paid.method,
                }),
            )
            .await;
    }

    pub(super) async fn emit_failed(&self, failed: &Payment, reason: &str) {
        self.notifications
            .emit(
                NotificationType::PaymentFailed,
                "Payment failed",
                &format!("{}: {reason}", failed.transaction_id),
                json!({
                    "payment_id": failed.id,
                    "transaction_id": failed.transaction_id,
                    "session_id": failed.session_id,
                    "order_id": failed.order_id,
                    "reason": reason,
                }),
            )
            .await;
    }
}
