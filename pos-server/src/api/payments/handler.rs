//! Payment handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    BankTransfer, BankTransferStatus, Payment, PaymentCreate, PaymentFail, PaymentFilter,
    PaymentProcess, PaymentRefund,
};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ValidatedJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Default, Deserialize)]
pub struct BankTransferQuery {
    pub status: Option<BankTransferStatus>,
}

/// GET /api/payments?status=&method=&session_id=&order_id=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<PaymentFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Payment>>>> {
    Ok(ok(state.payments.list(&filter, &page).await?))
}

/// GET /api/payments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    Ok(ok(state.payments.get(id).await?))
}

/// POST /api/payments - 创建待支付记录
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<PaymentCreate>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    Ok(ok(state.payments.create_payment(payload, Some(current.id)).await?))
}

/// POST /api/payments/{id}/process - 确认收款
pub async fn process(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<PaymentProcess>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    Ok(ok(state.payments.process_payment(id, payload, Some(current.id)).await?))
}

/// POST /api/payments/{id}/fail
pub async fn fail(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<PaymentFail>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    Ok(ok(state.payments.fail_payment(id, payload.reason, Some(current.id)).await?))
}

/// POST /api/payments/{id}/refund
pub async fn refund(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<PaymentRefund>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let refunded = state
        .payments
        .refund_payment(id, &payload.reason, payload.notes, current.id)
        .await?;
    Ok(ok(refunded))
}

/// GET /api/payments/bank-transfers?status= - 回调流水，供人工对账
pub async fn bank_transfers(
    State(state): State<ServerState>,
    Query(query): Query<BankTransferQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<BankTransfer>>>> {
    Ok(ok(state.payments.list_bank_transfers(query.status, &page).await?))
}
