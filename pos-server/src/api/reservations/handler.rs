//! Reservation handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    Reservation, ReservationCreate, ReservationFilter, ReservationStatusUpdate, ReservationUpdate,
};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ValidatedJson;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/reservations?status=&table_id=&from=&to=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ReservationFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Reservation>>>> {
    Ok(ok(state.reservations.list(&filter, &page).await?))
}

/// GET /api/reservations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    Ok(ok(state.reservations.get(id).await?))
}

/// POST /api/reservations
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<ReservationCreate>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    Ok(ok(state.reservations.create(payload).await?))
}

/// PUT /api/reservations/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ReservationUpdate>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    Ok(ok(state.reservations.update(id, payload).await?))
}

/// PATCH /api/reservations/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<ReservationStatusUpdate>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    Ok(ok(state.reservations.update_status(id, payload.status).await?))
}

/// DELETE /api/reservations/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    state.reservations.delete(id).await?;
    Ok(ok(true))
}
