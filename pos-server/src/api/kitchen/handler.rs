//! Kitchen display handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{KitchenFilter, KitchenQueueItem, OrderItem, OrderItemStatusUpdate};

use crate::api::ValidatedJson;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/kitchen/queue?status= - 未上桌的菜品，先进先出
pub async fn queue(
    State(state): State<ServerState>,
    Query(filter): Query<KitchenFilter>,
) -> AppResult<Json<ApiResponse<Vec<KitchenQueueItem>>>> {
    Ok(ok(state.orders.kitchen_queue(filter.status).await?))
}

/// PATCH /api/kitchen/items/{id}/status
pub async fn update_item_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<OrderItemStatusUpdate>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    Ok(ok(state.orders.update_item_status(id, payload.status).await?))
}
