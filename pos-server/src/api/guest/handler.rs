//! Guest ordering handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::json;
use shared::models::{
    Category, CustomerRequestCreate, GuestOrderCreate, MenuItem, NotificationType, OrderDetail,
    OrderItemsAdd, SessionBill, SessionInit, SessionInitResponse, TableSessionDetail,
};

use crate::api::ValidatedJson;
use crate::auth::extractor::Guest;
use crate::core::ServerState;
use crate::db::repository::{category, menu_item};
use crate::utils::validation::normalize_optional_text;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct GuestMenu {
    pub categories: Vec<Category>,
    pub items: Vec<MenuItem>,
}

/// POST /api/guest/sessions/init - 扫码开台，密钥只返回这一次
pub async fn init_session(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<SessionInit>,
) -> AppResult<Json<ApiResponse<SessionInitResponse>>> {
    Ok(ok(state.sessions.init(payload).await?))
}

/// GET /api/guest/menu - 上架菜品 (分类启用中)
pub async fn menu(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<GuestMenu>>> {
    let categories = category::find_all(&state.pool, true).await?;
    let items = menu_item::find_available(&state.pool).await?;
    Ok(ok(GuestMenu { categories, items }))
}

/// GET /api/guest/session
pub async fn current_session(
    State(state): State<ServerState>,
    Guest(guest): Guest,
) -> AppResult<Json<ApiResponse<TableSessionDetail>>> {
    Ok(ok(state.sessions.get(guest.session_id).await?))
}

/// GET /api/guest/orders - 本会话订单
pub async fn list_orders(
    State(state): State<ServerState>,
    Guest(guest): Guest,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    Ok(ok(state.orders.list_by_session(guest.session_id).await?))
}

/// POST /api/guest/orders
pub async fn create_order(
    State(state): State<ServerState>,
    Guest(guest): Guest,
    ValidatedJson(payload): ValidatedJson<GuestOrderCreate>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let notes = normalize_optional_text(payload.notes);
    let order = state
        .orders
        .create_guest_order(guest.session_id, &payload.items, notes.as_deref())
        .await?;
    Ok(ok(order))
}

/// GET /api/guest/orders/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    Guest(guest): Guest,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    Ok(ok(state.orders.get_for_session(guest.session_id, id).await?))
}

/// POST /api/guest/orders/{id}/items - 加菜
pub async fn add_items(
    State(state): State<ServerState>,
    Guest(guest): Guest,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<OrderItemsAdd>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let order = state
        .orders
        .add_guest_items(guest.session_id, id, &payload.items)
        .await?;
    Ok(ok(order))
}

/// POST /api/guest/requests - 呼叫服务员 / 请求结账
pub async fn create_request(
    State(state): State<ServerState>,
    Guest(guest): Guest,
    ValidatedJson(payload): ValidatedJson<CustomerRequestCreate>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let session = state.sessions.get(guest.session_id).await?;
    let note = normalize_optional_text(payload.note);
    let message = match note.as_deref() {
        Some(n) => format!("{}: {} ({n})", session.table_name, payload.kind.label()),
        None => format!("{}: {}", session.table_name, payload.kind.label()),
    };

    state
        .notifications
        .broadcast(
            NotificationType::CustomerRequest,
            payload.kind.label(),
            &message,
            json!({
                "session_id": guest.session_id,
                "table_id": guest.table_id,
                "table_name": session.table_name,
                "kind": payload.kind,
                "note": note,
            }),
        )
        .await?;

    tracing::info!(session_id = guest.session_id, kind = ?payload.kind, "Customer request sent");
    Ok(ok(true))
}

/// GET /api/guest/bill - 本会话账单 (不含折扣)
pub async fn bill(
    State(state): State<ServerState>,
    Guest(guest): Guest,
) -> AppResult<Json<ApiResponse<SessionBill>>> {
    Ok(ok(state.sessions.bill(guest.session_id, 0.0).await?))
}
