//! Customer handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ValidatedJson;
use crate::core::ServerState;
use crate::db::repository::{RepoError, customer};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    /// 姓名或电话模糊匹配
    pub search: Option<String>,
}

/// GET /api/customers?search=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CustomerQuery>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Customer>>>> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let (rows, total) = customer::find_page(&state.pool, search, &page).await?;
    Ok(ok(PaginatedResponse::from_query(rows, total, &page)))
}

/// GET /api/customers/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let found = customer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    Ok(ok(found))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<CustomerCreate>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let created = customer::create(&state.pool, &payload, shared::util::now_millis())
        .await
        .map_err(map_repo_error)?;
    tracing::info!(customer_id = created.id, "Customer created");
    Ok(ok(created))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CustomerUpdate>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let updated = customer::update(&state.pool, id, &payload, shared::util::now_millis())
        .await
        .map_err(map_repo_error)?;
    Ok(ok(updated))
}

/// DELETE /api/customers/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    if !customer::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::CustomerNotFound));
    }
    tracing::info!(customer_id = id, "Customer deleted");
    Ok(ok(true))
}

fn map_repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::CustomerPhoneExists),
        RepoError::NotFound(_) => AppError::new(ErrorCode::CustomerNotFound),
        other => other.into(),
    }
}
