use serde_json::json;
use shared::lifecycle::StatusMachine;
use shared::models::{
    DiningTable, NotificationType, Reservation, ReservationCreate, ReservationFilter,
    ReservationStatus, ReservationUpdate,
};
use shared::pagination::{PageQuery, PaginatedResponse};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{RepoError, customer, dining_table, reservation};
use crate::notifications::NotificationService;
use crate::utils::validation::normalize_optional_text;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 预订服务
///
/// PENDING / CONFIRMED 的预订占用桌台时段 `[reserved_at, reserved_at + duration)`，
/// 同桌时段重叠的创建、改期、确认都会被拒绝 (ReservationConflict)。
#[derive(Clone, Debug)]
pub struct ReservationService {
    pool: SqlitePool,
    notifications: NotificationService,
}

impl ReservationService {
    pub fn new(pool: SqlitePool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    pub async fn create(&self, mut input: ReservationCreate) -> AppResult<Reservation> {
        let table = self.find_table(input.table_id).await?;
        check_party_size(input.party_size, &table)?;
        if let Some(customer_id) = input.customer_id {
            customer::find_by_id(&self.pool, customer_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
        }
        input.notes = normalize_optional_text(input.notes);

        let start = input.reserved_at;
        let end = start + i64::from(input.duration_minutes) * 60_000;
        let now = shared::util::now_millis();

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        ensure_slot_free(&mut tx, input.table_id, start, end, None).await?;
        let created = reservation::insert(&mut *tx, &input, now).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            reservation_id = created.id,
            table_id = created.table_id,
            reserved_at = created.reserved_at,
            "Reservation created"
        );
        self.emit_changed(&created, &table, "created").await;
        Ok(created)
    }

    /// 修改预订信息 (状态变化走 [`update_status`](Self::update_status))
    pub async fn update(&self, id: i64, input: ReservationUpdate) -> AppResult<Reservation> {
        let mut merged = self.get(id).await?;
        if !merged.status.blocks_table() {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                "Closed reservations cannot be edited",
            )
            .with_detail("status", merged.status.as_str()));
        }

        if let Some(table_id) = input.table_id {
            merged.table_id = table_id;
        }
        if let Some(name) = input.customer_name {
            merged.customer_name = name.trim().to_string();
        }
        if let Some(phone) = input.customer_phone {
            merged.customer_phone = phone.trim().to_string();
        }
        if let Some(party_size) = input.party_size {
            merged.party_size = party_size;
        }
        if let Some(reserved_at) = input.reserved_at {
            merged.reserved_at = reserved_at;
        }
        if let Some(duration) = input.duration_minutes {
            merged.duration_minutes = duration;
        }
        if input.notes.is_some() {
            merged.notes = normalize_optional_text(input.notes);
        }

        let table = self.find_table(merged.table_id).await?;
        check_party_size(merged.party_size, &table)?;

        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        ensure_slot_free(&mut tx, merged.table_id, merged.reserved_at, merged.ends_at(), Some(id))
            .await?;
        reservation::update(&mut *tx, &merged, now).await?;
        tx.commit().await.map_err(RepoError::from)?;

        self.get(id).await
    }

    /// 状态前进；确认时再次检查时段
    pub async fn update_status(&self, id: i64, target: ReservationStatus) -> AppResult<Reservation> {
        let current = self.get(id).await?;
        let target = current.status.transition_to(target)?;
        let now = shared::util::now_millis();

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        if target == ReservationStatus::Confirmed {
            ensure_slot_free(&mut tx, current.table_id, current.reserved_at, current.ends_at(), Some(id))
                .await?;
        }
        if !reservation::update_status_if(&mut *tx, id, current.status, target, now).await? {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                "Reservation status changed concurrently",
            ));
        }
        tx.commit().await.map_err(RepoError::from)?;

        let updated = self.get(id).await?;
        tracing::info!(
            reservation_id = id,
            from = current.status.as_str(),
            to = target.as_str(),
            "Reservation status updated"
        );
        match dining_table::find_by_id(&self.pool, updated.table_id).await? {
            Some(table) => self.emit_changed(&updated, &table, target.as_str()).await,
            None => tracing::warn!(reservation_id = id, "Reservation table missing"),
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !reservation::delete(&self.pool, id).await? {
            return Err(AppError::new(ErrorCode::ReservationNotFound));
        }
        tracing::info!(reservation_id = id, "Reservation deleted");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> AppResult<Reservation> {
        reservation::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ReservationNotFound))
    }

    pub async fn list(
        &self,
        filter: &ReservationFilter,
        page: &PageQuery,
    ) -> AppResult<PaginatedResponse<Reservation>> {
        let (rows, total) = reservation::find_page(&self.pool, filter, page).await?;
        Ok(PaginatedResponse::from_query(rows, total, page))
    }

    async fn find_table(&self, table_id: i64) -> AppResult<DiningTable> {
        let table = dining_table::find_by_id(&self.pool, table_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
        if !table.is_active {
            return Err(AppError::new(ErrorCode::TableInactive).with_detail("table_id", table_id));
        }
        Ok(table)
    }

    async fn emit_changed(&self, r: &Reservation, table: &DiningTable, change: &str) {
        self.notifications
            .emit(
                NotificationType::ReservationChanged,
                "Reservation updated",
                &format!(
                    "{} ({} guests) at {}: {}",
                    r.customer_name, r.party_size, table.name, change
                ),
                json!({
                    "reservation_id": r.id,
                    "table_id": r.table_id,
                    "status": r.status,
                    "reserved_at": r.reserved_at,
                }),
            )
            .await;
    }
}

fn check_party_size(party_size: i32, table: &DiningTable) -> AppResult<()> {
    if party_size < 1 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Party size must be at least 1",
        ));
    }
    if party_size > table.capacity {
        return Err(AppError::new(ErrorCode::PartySizeExceedsCapacity)
            .with_detail("party_size", party_size)
            .with_detail("capacity", table.capacity));
    }
    Ok(())
}

async fn ensure_slot_free(
    conn: &mut SqliteConnection,
    table_id: i64,
    start: i64,
    end: i64,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let overlaps = reservation::count_overlaps(&mut *conn, table_id, start, end, exclude_id).await?;
    if overlaps > 0 {
        return Err(AppError::new(ErrorCode::ReservationConflict)
            .with_detail("table_id", table_id)
            .with_detail("overlapping", overlaps));
    }
    Ok(())
}
