//! 预订: 时段冲突、容量、状态流转

mod common;

use shared::models::{ReservationCreate, ReservationStatus, ReservationUpdate};
use shared::ErrorCode;

const HOUR: i64 = 3_600_000;

fn booking(table_id: i64, reserved_at: i64, party_size: i32) -> ReservationCreate {
    ReservationCreate {
        table_id,
        customer_id: None,
        customer_name: "Nguyen Van A".into(),
        customer_phone: "0901234567".into(),
        party_size,
        reserved_at,
        duration_minutes: 120,
        notes: None,
    }
}

fn tomorrow_noon() -> i64 {
    let now = shared::util::now_millis();
    now - now % (24 * HOUR) + 36 * HOUR
}

#[tokio::test]
async fn test_overlapping_reservation_is_rejected() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let start = tomorrow_noon();

    let first = state
        .reservations
        .create(booking(fx.table.id, start, 2))
        .await
        .expect("first booking");
    assert_eq!(first.status, ReservationStatus::Pending);

    let err = state
        .reservations
        .create(booking(fx.table.id, start + HOUR, 2))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationConflict);

    // 首尾相接不算重叠
    let adjacent = state
        .reservations
        .create(booking(fx.table.id, start + 2 * HOUR, 2))
        .await
        .expect("adjacent slot");
    assert_eq!(adjacent.reserved_at, start + 2 * HOUR);

    // 改期撞上别的预订
    let err = state
        .reservations
        .update(
            adjacent.id,
            ReservationUpdate {
                reserved_at: Some(start + HOUR),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationConflict);

    // 取消后时段释放，[start, start+2h) 不碰相邻预订
    state
        .reservations
        .update_status(first.id, ReservationStatus::Cancelled)
        .await
        .expect("cancel");
    let rebooked = state
        .reservations
        .create(booking(fx.table.id, start, 2))
        .await
        .expect("slot is free again");
    assert_eq!(rebooked.status, ReservationStatus::Pending);

    // 半小时偏移仍与相邻预订重叠
    let err = state
        .reservations
        .create(ReservationCreate {
            duration_minutes: 60,
            ..booking(fx.table.id, start + 3 * HOUR / 2, 2)
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationConflict);
}

#[tokio::test]
async fn test_party_size_must_fit_table() {
    let fx = common::fixture().await;
    let err = fx
        .state
        .reservations
        .create(booking(fx.table.id, tomorrow_noon(), 9))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PartySizeExceedsCapacity);
}

#[tokio::test]
async fn test_status_flow_and_closed_edit() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let created = state
        .reservations
        .create(booking(fx.table.id, tomorrow_noon(), 3))
        .await
        .expect("booking");

    let confirmed = state
        .reservations
        .update_status(created.id, ReservationStatus::Confirmed)
        .await
        .expect("confirm");
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);

    let completed = state
        .reservations
        .update_status(created.id, ReservationStatus::Completed)
        .await
        .expect("complete");
    assert_eq!(completed.status, ReservationStatus::Completed);

    let err = state
        .reservations
        .update_status(created.id, ReservationStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStatusTransition);

    let err = state
        .reservations
        .update(
            created.id,
            ReservationUpdate {
                party_size: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
}

#[tokio::test]
async fn test_delete_unknown_reservation() {
    let fx = common::fixture().await;
    let err = fx.state.reservations.delete(4242).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReservationNotFound);
}
