//! Notification handlers (scoped to the caller)

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use shared::models::{Notification, NotificationFilter};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedAll {
    pub updated: u64,
}

/// GET /api/notifications?is_read=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(filter): Query<NotificationFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Notification>>>> {
    Ok(ok(state.notifications.list(current.id, filter.is_read, &page).await?))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let count = state.notifications.unread_count(current.id).await?;
    Ok(ok(UnreadCount { count }))
}

/// POST /api/notifications/{id}/read - 幂等，返回最新未读数
pub async fn mark_as_read(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let count = state.notifications.mark_as_read(current.id, id).await?;
    Ok(ok(UnreadCount { count }))
}

/// POST /api/notifications/read-all
pub async fn mark_all_as_read(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<MarkedAll>>> {
    let updated = state.notifications.mark_all_as_read(current.id).await?;
    Ok(ok(MarkedAll { updated }))
}
