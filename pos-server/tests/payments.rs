//! 支付: 金额校验、退款、银行转账回调对账

mod common;

use shared::models::{
    BankTransferPayload, BankTransferStatus, Payment, PaymentCreate, PaymentMethod,
    PaymentProcess, PaymentStatus,
};
use shared::ErrorCode;
use pos_server::ServerState;

async fn pending(state: &ServerState, session_id: i64, method: PaymentMethod, total: f64) -> Payment {
    let tax = (total / 11.0 * 100.0).round() / 100.0;
    let subtotal = ((total - tax) * 100.0).round() / 100.0;
    state
        .payments
        .create_payment(
            PaymentCreate {
                session_id: Some(session_id),
                order_id: None,
                subtotal,
                tax,
                discount: 0.0,
                total_amount: total,
                method,
                notes: None,
            },
            Some(1),
        )
        .await
        .expect("payment should be created")
}

fn transfer(id: i64, content: &str, amount: f64) -> BankTransferPayload {
    BankTransferPayload {
        id,
        gateway: "Vietcombank".into(),
        transaction_date: "2026-10-19 12:30:00".into(),
        account_number: "0123456789".into(),
        code: None,
        content: content.into(),
        transfer_type: "in".into(),
        transfer_amount: amount,
        accumulated: 1_000_000.0,
        sub_account: None,
        reference_code: Some(format!("FT{id}")),
    }
}

async fn transfer_status(state: &ServerState, provider_id: i64) -> BankTransferStatus {
    pos_server::db::repository::bank_transfer::find_by_id(&state.pool, provider_id)
        .await
        .expect("query")
        .expect("transfer should be recorded")
        .status
}

#[tokio::test]
async fn test_total_must_match_components() {
    let fx = common::fixture().await;
    let opened = common::open_session(&fx.state, fx.table.id).await;

    let err = fx
        .state
        .payments
        .create_payment(
            PaymentCreate {
                session_id: Some(opened.session.id),
                order_id: None,
                subtotal: 100.0,
                tax: 10.0,
                discount: 5.0,
                total_amount: 110.0,
                method: PaymentMethod::Card,
                notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentAmountMismatch);

    let err = fx
        .state
        .payments
        .create_payment(
            PaymentCreate {
                session_id: None,
                order_id: None,
                subtotal: 1.0,
                tax: 0.0,
                discount: 0.0,
                total_amount: 1.0,
                method: PaymentMethod::Cash,
                notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentTargetRequired);

    let ok = fx
        .state
        .payments
        .create_payment(
            PaymentCreate {
                session_id: Some(opened.session.id),
                order_id: None,
                subtotal: 100.0,
                tax: 10.0,
                discount: 5.0,
                total_amount: 105.0,
                method: PaymentMethod::Card,
                notes: None,
            },
            None,
        )
        .await
        .expect("consistent total");
    assert_eq!(ok.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_sub_cent_total_is_rejected() {
    let fx = common::fixture().await;
    let opened = common::open_session(&fx.state, fx.table.id).await;

    // 105.009 ≠ 100 + 10 − 5
    let err = fx
        .state
        .payments
        .create_payment(
            PaymentCreate {
                session_id: Some(opened.session.id),
                order_id: None,
                subtotal: 100.0,
                tax: 10.0,
                discount: 5.0,
                total_amount: 105.009,
                method: PaymentMethod::Card,
                notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(&fx.state.pool)
        .await
        .expect("count");
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_refund_requires_paid_and_reason() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;
    let payment = pending(state, opened.session.id, PaymentMethod::Cash, 55.0).await;

    let err = state
        .payments
        .refund_payment(payment.id, "customer complaint", None, 1)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentNotPaid);

    state
        .payments
        .process_payment(
            payment.id,
            PaymentProcess {
                transaction_id: None,
                notes: None,
            },
            Some(1),
        )
        .await
        .expect("settle");

    let err = state
        .payments
        .refund_payment(payment.id, "   ", None, 1)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RefundReasonRequired);

    let refunded = state
        .payments
        .refund_payment(payment.id, "customer complaint", Some("manager approved".into()), 1)
        .await
        .expect("refund");
    assert_eq!(refunded.status, PaymentStatus::Refunded);
    assert_eq!(refunded.refund_reason.as_deref(), Some("customer complaint"));

    let err = state
        .payments
        .refund_payment(payment.id, "again", None, 1)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentNotPaid);
}

#[tokio::test]
async fn test_manual_bank_confirmation_checks_transaction_id() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;
    let payment = pending(state, opened.session.id, PaymentMethod::Banking, 33.0).await;

    let err = state
        .payments
        .process_payment(
            payment.id,
            PaymentProcess {
                transaction_id: None,
                notes: None,
            },
            Some(1),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TransactionIdInvalid);

    let err = state
        .payments
        .process_payment(
            payment.id,
            PaymentProcess {
                transaction_id: Some("TXAAAAAAAAAA".into()),
                notes: None,
            },
            Some(1),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TransactionIdUnmatched);

    // 交易号区分大小写
    let err = state
        .payments
        .process_payment(
            payment.id,
            PaymentProcess {
                transaction_id: Some(payment.transaction_id.to_ascii_lowercase()),
                notes: None,
            },
            Some(1),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TransactionIdInvalid);

    let paid = state
        .payments
        .process_payment(
            payment.id,
            PaymentProcess {
                transaction_id: Some(format!("  {}  ", payment.transaction_id)),
                notes: None,
            },
            Some(1),
        )
        .await
        .expect("matching transaction id");
    assert_eq!(paid.status, PaymentStatus::Paid);
}

#[tokio::test]
async fn test_webhook_matches_pending_bank_transfer() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;
    let payment = pending(state, opened.session.id, PaymentMethod::Banking, 30.8).await;

    let content = format!("MBVCB.123 {} thanh toan", payment.transaction_id);
    let ack = state
        .payments
        .reconcile_bank_transfer(&transfer(9001, &content, 30.8))
        .await
        .expect("matched");
    assert_eq!(ack.status, BankTransferStatus::Matched);
    assert_eq!(ack.payment_id, Some(payment.id));
    assert!(!ack.duplicate);

    let paid = state.payments.get(payment.id).await.expect("payment");
    assert_eq!(paid.status, PaymentStatus::Paid);
    assert_eq!(transfer_status(state, 9001).await, BankTransferStatus::Matched);

    // 同一 provider id 重放
    let replay = state
        .payments
        .reconcile_bank_transfer(&transfer(9001, &content, 30.8))
        .await
        .expect("duplicate is acknowledged");
    assert!(replay.duplicate);
    assert_eq!(replay.status, BankTransferStatus::Matched);
    assert_eq!(replay.payment_id, Some(payment.id));

    // 新的转账指向已支付记录
    let err = state
        .payments
        .reconcile_bank_transfer(&transfer(9002, &content, 30.8))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentNotPending);
    assert_eq!(transfer_status(state, 9002).await, BankTransferStatus::Rejected);
}

#[tokio::test]
async fn test_webhook_unmatched_and_amount_mismatch() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;
    let payment = pending(state, opened.session.id, PaymentMethod::Banking, 44.0).await;

    let err = state
        .payments
        .reconcile_bank_transfer(&transfer(7001, "chuyen tien an trua", 44.0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TransactionIdUnmatched);
    assert_eq!(transfer_status(state, 7001).await, BankTransferStatus::Unmatched);

    let content = format!("pay {}", payment.transaction_id);
    let err = state
        .payments
        .reconcile_bank_transfer(&transfer(7002, &content, 40.0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TransferAmountMismatch);
    assert_eq!(
        transfer_status(state, 7002).await,
        BankTransferStatus::AmountMismatch
    );

    // 差 0.004 也算金额不符
    let err = state
        .payments
        .reconcile_bank_transfer(&transfer(7003, &content, 44.004))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TransferAmountMismatch);
    assert_eq!(
        transfer_status(state, 7003).await,
        BankTransferStatus::AmountMismatch
    );

    let still_pending = state.payments.get(payment.id).await.expect("payment");
    assert_eq!(still_pending.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_webhook_outgoing_and_wrong_method() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;
    let cash = pending(state, opened.session.id, PaymentMethod::Cash, 20.0).await;

    let mut outgoing = transfer(8001, &cash.transaction_id, 20.0);
    outgoing.transfer_type = "out".into();
    let ack = state
        .payments
        .reconcile_bank_transfer(&outgoing)
        .await
        .expect("outgoing is acknowledged");
    assert_eq!(ack.status, BankTransferStatus::Ignored);

    let err = state
        .payments
        .reconcile_bank_transfer(&transfer(8002, &cash.transaction_id, 20.0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentMethodMismatch);
    assert_eq!(transfer_status(state, 8002).await, BankTransferStatus::Rejected);
}
