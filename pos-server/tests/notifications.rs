//! 通知: 先落库再推送、已读幂等、未读数

mod common;

use serde_json::json;
use shared::message::ServerEvent;
use shared::models::NotificationType;
use shared::pagination::PageQuery;
use shared::ErrorCode;

const ADMIN: i64 = 1;

#[tokio::test]
async fn test_notify_persists_then_pushes() {
    let state = common::state().await;
    let service = &state.notifications;
    let mut rx = service.hub().register(ADMIN);

    let created = service
        .notify_user(
            ADMIN,
            NotificationType::CustomerRequest,
            "Table 5",
            "Guest asked for water",
            json!({ "table_id": 5 }),
        )
        .await
        .expect("notify");
    assert!(!created.is_read);

    let page = service
        .list(ADMIN, Some(false), &PageQuery::default())
        .await
        .expect("list");
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, created.id);
    assert_eq!(page.data[0].metadata["table_id"], 5);

    match rx.try_recv().expect("notification event") {
        ServerEvent::Notification(n) => assert_eq!(n.id, created.id),
        other => panic!("unexpected event: {other:?}"),
    }
    match rx.try_recv().expect("unread count event") {
        ServerEvent::UnreadCount { count } => assert_eq!(count, 1),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_offline_user_still_gets_the_row() {
    let state = common::state().await;
    let service = &state.notifications;
    assert!(!service.hub().is_online(ADMIN));

    service
        .notify_user(
            ADMIN,
            NotificationType::OrderReady,
            "Order ready",
            "Beef Noodles x1 is ready",
            json!({}),
        )
        .await
        .expect("notify");
    assert_eq!(service.unread_count(ADMIN).await.expect("count"), 1);
}

#[tokio::test]
async fn test_mark_as_read_is_idempotent() {
    let state = common::state().await;
    let service = &state.notifications;

    let first = service
        .notify_user(ADMIN, NotificationType::NewOrder, "New order", "#1", json!({}))
        .await
        .expect("notify");
    service
        .notify_user(ADMIN, NotificationType::NewOrder, "New order", "#2", json!({}))
        .await
        .expect("notify");
    assert_eq!(service.unread_count(ADMIN).await.expect("count"), 2);

    let mut rx = service.hub().register(ADMIN);
    assert_eq!(service.mark_as_read(ADMIN, first.id).await.expect("read"), 1);
    match rx.try_recv().expect("unread count event") {
        ServerEvent::UnreadCount { count } => assert_eq!(count, 1),
        other => panic!("unexpected event: {other:?}"),
    }

    // 重复标记: 结果不变，也不再推送
    assert_eq!(service.mark_as_read(ADMIN, first.id).await.expect("read again"), 1);
    assert!(rx.try_recv().is_err());

    let err = service.mark_as_read(ADMIN, 999_999).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotificationNotFound);
}

#[tokio::test]
async fn test_mark_all_as_read_is_idempotent() {
    let state = common::state().await;
    let service = &state.notifications;

    service
        .emit(
            NotificationType::PaymentSuccess,
            "Payment received",
            "TXABCDEFGH23 paid",
            json!({ "payment_id": 1 }),
        )
        .await;
    service
        .notify_user(ADMIN, NotificationType::PaymentFailed, "Payment failed", "declined", json!({}))
        .await
        .expect("notify");
    assert_eq!(service.unread_count(ADMIN).await.expect("count"), 2);

    assert_eq!(service.mark_all_as_read(ADMIN).await.expect("read all"), 2);
    assert_eq!(service.mark_all_as_read(ADMIN).await.expect("read all again"), 0);
    assert_eq!(service.unread_count(ADMIN).await.expect("count"), 0);

    let read = service
        .list(ADMIN, Some(true), &PageQuery::default())
        .await
        .expect("list");
    assert_eq!(read.total, 2);
    assert!(read.data.iter().all(|n| n.is_read && n.read_at.is_some()));
}
