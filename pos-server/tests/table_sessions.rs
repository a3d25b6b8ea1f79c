//! 桌台会话: 一桌一个 OPEN 会话、重复关台、扫码令牌

mod common;

use shared::models::{SessionInit, SessionStatus, SessionUpdate};
use shared::ErrorCode;

#[tokio::test]
async fn test_concurrent_init_opens_exactly_one_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let fx = common::seed_catalog(common::file_state(&dir).await).await;
    let state = &fx.state;

    let qr = state.sessions.issue_table_qr(fx.table.id).await.expect("qr");
    let init = |token: String| {
        let sessions = state.sessions.clone();
        async move {
            sessions
                .init(SessionInit {
                    token,
                    customer_count: Some(2),
                    notes: None,
                })
                .await
        }
    };

    let (a, b) = tokio::join!(init(qr.token.clone()), init(qr.token.clone()));
    let results = [a, b];
    let opened = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(opened, 1, "exactly one init should succeed");

    let err = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one init should fail");
    assert_eq!(err.code, ErrorCode::TableOccupied);
}

#[tokio::test]
async fn test_second_init_on_occupied_table() {
    let fx = common::fixture().await;
    let state = &fx.state;
    common::open_session(state, fx.table.id).await;

    let qr = state.sessions.issue_table_qr(fx.table.id).await.expect("qr");
    let err = state
        .sessions
        .init(SessionInit {
            token: qr.token,
            customer_count: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TableOccupied);
}

#[tokio::test]
async fn test_close_twice_is_rejected() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;

    let closed = state
        .sessions
        .close(opened.session.id, None)
        .await
        .expect("first close");
    assert_eq!(closed.session.status, SessionStatus::Closed);
    assert!(closed.session.closed_at.is_some());

    let err = state
        .sessions
        .close(opened.session.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SessionAlreadyClosed);

    let err = state
        .sessions
        .update(
            opened.session.id,
            SessionUpdate {
                customer_count: None,
                notes: None,
                status: Some(SessionStatus::Closed),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SessionAlreadyClosed);

    // 关台后可以重新开台
    let reopened = common::open_session(state, fx.table.id).await;
    assert_ne!(reopened.session.id, opened.session.id);
}

#[tokio::test]
async fn test_update_session_details() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;

    let updated = state
        .sessions
        .update(
            opened.session.id,
            SessionUpdate {
                customer_count: Some(4),
                notes: Some("  birthday  ".into()),
                status: None,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.session.customer_count, Some(4));
    assert_eq!(updated.session.notes.as_deref(), Some("birthday"));
    assert_eq!(updated.session.status, SessionStatus::Open);
}

#[tokio::test]
async fn test_tampered_qr_token_is_rejected() {
    let fx = common::fixture().await;
    let state = &fx.state;

    let err = state
        .sessions
        .init(SessionInit {
            token: "not-a-token".into(),
            customer_count: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::QrTokenInvalid);

    // 员工令牌不能当扫码令牌用
    let staff = common::admin_token(state);
    let err = state
        .sessions
        .init(SessionInit {
            token: staff,
            customer_count: None,
            notes: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::QrTokenInvalid);
}

#[tokio::test]
async fn test_qr_for_unknown_table() {
    let fx = common::fixture().await;
    let err = fx.state.sessions.issue_table_qr(9999).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TableNotFound);
}
