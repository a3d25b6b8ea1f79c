//! Bank transfer webhook handler

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use shared::models::{BankTransferPayload, WebhookAck};

use crate::core::ServerState;
use crate::payments::webhook::verify_api_key;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

/// POST /api/webhooks/bank-transfer
///
/// 响应体直接是 [`WebhookAck`] (网关只看 HTTP 状态码和 `success`)
pub async fn bank_transfer(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Json<BankTransferPayload>, JsonRejection>,
) -> AppResult<Json<WebhookAck>> {
    let authorization = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if !verify_api_key(state.config.bank_webhook_api_key.as_deref(), authorization) {
        security_log!(WARN, "webhook_unauthorized", has_header = authorization.is_some());
        return Err(AppError::new(ErrorCode::WebhookUnauthorized));
    }

    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(target: "reconciliation", error = %rejection.body_text(), "Malformed bank webhook payload");
        AppError::validation(rejection.body_text())
    })?;

    tracing::info!(
        target: "reconciliation",
        provider_id = payload.id,
        gateway = %payload.gateway,
        amount = payload.transfer_amount,
        transfer_type = %payload.transfer_type,
        "Bank transfer webhook received"
    );

    let ack = state.payments.reconcile_bank_transfer(&payload).await?;
    Ok(Json(ack))
}
