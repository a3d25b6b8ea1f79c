//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    OrderBill, OrderCreate, OrderDetail, OrderFilter, OrderItemsAdd, OrderStatusUpdate,
};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ValidatedJson;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Default, Deserialize)]
pub struct BillQuery {
    #[serde(default)]
    pub discount: f64,
}

/// GET /api/orders?status=&session_id=&order_type=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<OrderDetail>>>> {
    Ok(ok(state.orders.list(&filter, &page).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    Ok(ok(state.orders.get(id).await?))
}

/// GET /api/orders/{id}/bill?discount=
pub async fn bill(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<BillQuery>,
) -> AppResult<Json<ApiResponse<OrderBill>>> {
    Ok(ok(state.orders.order_bill(id, query.discount).await?))
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidatedJson(payload): ValidatedJson<OrderCreate>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    Ok(ok(state.orders.create_order(payload, Some(current.id)).await?))
}

/// POST /api/orders/{id}/items
pub async fn add_items(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<OrderItemsAdd>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    Ok(ok(state.orders.add_items(id, &payload.items).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<OrderStatusUpdate>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let order = state.orders.update_order_status(id, payload.status).await?;
    tracing::info!(order_id = id, user_id = current.id, status = ?payload.status, "Order status changed by staff");
    Ok(ok(order))
}
