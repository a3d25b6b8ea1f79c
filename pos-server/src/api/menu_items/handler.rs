//! Menu item handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{MenuItem, MenuItemCreate, MenuItemFilter, MenuItemUpdate};
use shared::pagination::{PageQuery, PaginatedResponse};

use crate::api::ValidatedJson;
use crate::core::ServerState;
use crate::db::repository::{RepoError, category, menu_item};
use crate::orders::money::MAX_AMOUNT;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// GET /api/menu-items?category_id=&is_available=&search=&page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<MenuItemFilter>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<MenuItem>>>> {
    let (rows, total) = menu_item::find_page(&state.pool, &filter, &page).await?;
    Ok(ok(PaginatedResponse::from_query(rows, total, &page)))
}

/// GET /api/menu-items/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let found = menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    Ok(ok(found))
}

/// POST /api/menu-items
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<MenuItemCreate>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    check_price(payload.price)?;
    ensure_category(&state, payload.category_id).await?;

    let created = menu_item::create(&state.pool, &payload, shared::util::now_millis())
        .await
        .map_err(map_repo_error)?;
    tracing::info!(menu_item_id = created.id, name = %created.name, "Menu item created");
    Ok(ok(created))
}

/// PUT /api/menu-items/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<MenuItemUpdate>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    if let Some(price) = payload.price {
        check_price(price)?;
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&state, category_id).await?;
    }

    let updated = menu_item::update(&state.pool, id, &payload, shared::util::now_millis())
        .await
        .map_err(map_repo_error)?;
    Ok(ok(updated))
}

/// DELETE /api/menu-items/{id}
///
/// 已被订单引用的菜品只能下架 (`is_available = false`)，不能删除。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let referenced = menu_item::count_order_items(&state.pool, id).await?;
    if referenced > 0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            "Menu item is referenced by orders, mark it unavailable instead",
        )
        .with_detail("order_items", referenced));
    }
    if !menu_item::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::MenuItemNotFound));
    }
    Ok(ok(true))
}

fn check_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || !(0.0..=MAX_AMOUNT).contains(&price) {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice).with_detail("price", price));
    }
    Ok(())
}

async fn ensure_category(state: &ServerState, category_id: i64) -> AppResult<()> {
    category::find_by_id(&state.pool, category_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    Ok(())
}

fn map_repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(_) => AppError::new(ErrorCode::MenuItemNotFound),
        other => other.into(),
    }
}
