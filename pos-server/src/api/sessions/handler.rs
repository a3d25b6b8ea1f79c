//! Table session handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    OrderDetail, SessionBill, SessionClose, SessionFilter, SessionUpdate, TableSessionDetail,
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

/// GET /api/sessions?status=&table_id=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<SessionFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<TableSessionDetail>>>> {
    Ok(ok(state.sessions.list(&filter, &page).await?))
}

/// GET /api/sessions/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<TableSessionDetail>>> {
    Ok(ok(state.sessions.get(id).await?))
}

/// GET /api/sessions/{id}/orders
pub async fn orders(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<OrderDetail>>>> {
    state.sessions.get(id).await?;
    Ok(ok(state.orders.list_by_session(id).await?))
}

/// GET /api/sessions/{id}/bill?discount=
pub async fn bill(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<BillQuery>,
) -> AppResult<Json<ApiResponse<SessionBill>>> {
    Ok(ok(state.sessions.bill(id, query.discount).await?))
}

/// PUT /api/sessions/{id}
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<SessionUpdate>,
) -> AppResult<Json<ApiResponse<TableSessionDetail>>> {
    let updated = state.sessions.update(id, payload).await?;
    tracing::info!(session_id = id, user_id = current.id, "Session updated by staff");
    Ok(ok(updated))
}

/// POST /api/sessions/{id}/close
pub async fn close(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<SessionClose>,
) -> AppResult<Json<ApiResponse<TableSessionDetail>>> {
    let closed = state.sessions.close(id, payload.notes).await?;
    tracing::info!(session_id = id, user_id = current.id, "Session closed by staff");
    Ok(ok(closed))
}
