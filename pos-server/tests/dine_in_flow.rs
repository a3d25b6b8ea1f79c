//! 堂食全流程: 扫码开台 → 下单 → 出菜 → 完成 → 现金结账 → 关台

mod common;

use shared::models::{
    MenuItemCreate, OrderCreate, OrderItemInput, OrderItemStatus, OrderStatus, OrderType,
    PaymentCreate, PaymentMethod, PaymentProcess, PaymentStatus, SessionStatus,
};
use shared::ErrorCode;

#[tokio::test]
async fn test_dine_in_order_to_cash_payment() {
    let fx = common::fixture().await;
    let state = &fx.state;

    let opened = common::open_session(state, fx.table.id).await;
    assert_eq!(opened.table_name, "Table 5");
    assert_eq!(opened.session.status, SessionStatus::Open);

    let order = state
        .orders
        .create_order(
            OrderCreate {
                session_id: Some(opened.session.id),
                order_type: OrderType::DineIn,
                items: vec![
                    OrderItemInput {
                        menu_item_id: fx.noodles.id,
                        quantity: 2,
                        notes: Some("no cilantro".into()),
                    },
                    OrderItemInput {
                        menu_item_id: fx.tea.id,
                        quantity: 1,
                        notes: None,
                    },
                ],
                notes: None,
            },
            Some(1),
        )
        .await
        .expect("order should be created");
    assert_eq!(order.order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.table_name.as_deref(), Some("Table 5"));

    // 菜品未上齐不能完成
    state
        .orders
        .update_order_status(order.order.id, OrderStatus::Confirmed)
        .await
        .expect("confirm");
    let err = state
        .orders
        .update_order_status(order.order.id, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderHasUnservedItems);

    for item in &order.items {
        for step in [
            OrderItemStatus::Preparing,
            OrderItemStatus::Ready,
            OrderItemStatus::Served,
        ] {
            state
                .orders
                .update_item_status(item.id, step)
                .await
                .expect("item status should advance");
        }
    }

    let completed = state
        .orders
        .update_order_status(order.order.id, OrderStatus::Completed)
        .await
        .expect("complete");
    assert_eq!(completed.order.status, OrderStatus::Completed);

    let bill = state.orders.order_bill(order.order.id, 0.0).await.expect("bill");
    let lines: f64 = bill.items.iter().map(|l| l.line_total).sum();
    assert!((bill.subtotal - lines).abs() < 1e-9);
    assert!((bill.subtotal - 28.0).abs() < 1e-9);
    assert!((bill.tax - 2.8).abs() < 1e-9);
    assert!((bill.total - 30.8).abs() < 1e-9);

    let payment = state
        .payments
        .create_payment(
            PaymentCreate {
                session_id: Some(opened.session.id),
                order_id: Some(order.order.id),
                subtotal: bill.subtotal,
                tax: bill.tax,
                discount: 0.0,
                total_amount: bill.total,
                method: PaymentMethod::Cash,
                notes: None,
            },
            Some(1),
        )
        .await
        .expect("payment should be created");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(shared::transaction_id::is_valid(&payment.transaction_id));

    let paid = state
        .payments
        .process_payment(
            payment.id,
            PaymentProcess {
                transaction_id: None,
                notes: Some("cash".into()),
            },
            Some(1),
        )
        .await
        .expect("cash payment should settle");
    assert_eq!(paid.status, PaymentStatus::Paid);
    assert!(paid.paid_at.is_some());

    // 再次确认收款被拒
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
    assert_eq!(err.code, ErrorCode::PaymentNotPending);

    let closed = state
        .sessions
        .close(opened.session.id, Some("paid in cash".into()))
        .await
        .expect("close");
    assert_eq!(closed.session.status, SessionStatus::Closed);
}

#[tokio::test]
async fn test_session_bill_excludes_cancelled_orders() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;

    let keep = state
        .orders
        .create_guest_order(
            opened.session.id,
            &[OrderItemInput {
                menu_item_id: fx.noodles.id,
                quantity: 1,
                notes: None,
            }],
            None,
        )
        .await
        .expect("guest order");
    let cancelled = state
        .orders
        .create_guest_order(
            opened.session.id,
            &[OrderItemInput {
                menu_item_id: fx.tea.id,
                quantity: 3,
                notes: None,
            }],
            None,
        )
        .await
        .expect("guest order");
    state
        .orders
        .update_order_status(cancelled.order.id, OrderStatus::Cancelled)
        .await
        .expect("cancel");

    let bill = state
        .orders
        .session_bill(opened.session.id, 1.25)
        .await
        .expect("session bill");
    assert_eq!(bill.orders.len(), 1);
    assert_eq!(bill.orders[0].order_id, keep.order.id);
    assert!((bill.subtotal - 12.5).abs() < 1e-9);
    assert!((bill.tax - 1.25).abs() < 1e-9);
    assert!((bill.total - 12.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_dine_in_requires_session_and_takeaway_rejects_one() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;
    let items = vec![OrderItemInput {
        menu_item_id: fx.tea.id,
        quantity: 1,
        notes: None,
    }];

    let err = state
        .orders
        .create_order(
            OrderCreate {
                session_id: None,
                order_type: OrderType::DineIn,
                items: items.clone(),
                notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderTypeMismatch);

    let err = state
        .orders
        .create_order(
            OrderCreate {
                session_id: Some(opened.session.id),
                order_type: OrderType::Takeaway,
                items: items.clone(),
                notes: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderTypeMismatch);

    let takeaway = state
        .orders
        .create_order(
            OrderCreate {
                session_id: None,
                order_type: OrderType::Takeaway,
                items,
                notes: None,
            },
            None,
        )
        .await
        .expect("takeaway");
    assert_eq!(takeaway.table_name, None);
}

async fn order_rows(state: &pos_server::ServerState) -> (i64, i64) {
    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await
        .expect("count orders");
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(&state.pool)
        .await
        .expect("count items");
    (orders, items)
}

#[tokio::test]
async fn test_bad_line_leaves_no_partial_order() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;

    let sold_out = pos_server::db::repository::menu_item::create(
        &state.pool,
        &MenuItemCreate {
            name: "Crab Soup".into(),
            description: None,
            price: 9.5,
            category_id: fx.noodles.category_id,
            image_url: None,
            is_available: Some(false),
        },
        shared::util::now_millis(),
    )
    .await
    .expect("menu item");

    let order_with = |bad_id: i64| OrderCreate {
        session_id: Some(opened.session.id),
        order_type: OrderType::DineIn,
        items: vec![
            OrderItemInput {
                menu_item_id: fx.noodles.id,
                quantity: 1,
                notes: None,
            },
            OrderItemInput {
                menu_item_id: bad_id,
                quantity: 1,
                notes: None,
            },
        ],
        notes: None,
    };

    let err = state
        .orders
        .create_order(order_with(sold_out.id), Some(1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MenuItemUnavailable);
    assert_eq!(order_rows(state).await, (0, 0));

    let err = state
        .orders
        .create_order(order_with(424_242), Some(1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MenuItemNotFound);
    assert_eq!(order_rows(state).await, (0, 0));
}

#[tokio::test]
async fn test_item_status_cannot_move_backward() {
    let fx = common::fixture().await;
    let state = &fx.state;
    let opened = common::open_session(state, fx.table.id).await;

    let order = state
        .orders
        .create_guest_order(
            opened.session.id,
            &[OrderItemInput {
                menu_item_id: fx.noodles.id,
                quantity: 1,
                notes: None,
            }],
            None,
        )
        .await
        .expect("guest order");
    let item_id = order.items[0].id;

    // 可以跳步直接上菜
    let served = state
        .orders
        .update_item_status(item_id, OrderItemStatus::Served)
        .await
        .expect("serve");
    assert_eq!(served.status, OrderItemStatus::Served);

    for back in [
        OrderItemStatus::Ready,
        OrderItemStatus::Preparing,
        OrderItemStatus::Pending,
    ] {
        let err = state
            .orders
            .update_item_status(item_id, back)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
    }

    let current = state.orders.get(order.order.id).await.expect("order");
    assert_eq!(current.items[0].status, OrderItemStatus::Served);
}
