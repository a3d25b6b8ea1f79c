use std::sync::Arc;

use shared::lifecycle::StatusMachine;
use shared::models::{
    DiningTable, SessionBill, SessionFilter, SessionInit, SessionInitResponse, SessionStatus,
    SessionUpdate, TableQrCode, TableSessionDetail,
};
use shared::pagination::{PageQuery, PaginatedResponse};
use sqlx::SqlitePool;

use crate::auth::session_gate::{generate_session_secret, hash_session_secret};
use crate::auth::{JwtError, JwtService};
use crate::core::Config;
use crate::db::repository::table_session::{self, NewSession};
use crate::db::repository::{RepoError, dining_table};
use crate::orders::OrderService;
use crate::security_log;
use crate::utils::validation::normalize_optional_text;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 桌台会话服务
///
/// 一张桌同一时间最多一个 OPEN 会话，由部分唯一索引兜底:
/// 并发开台时后到的插入撞索引，映射为 TableOccupied。
#[derive(Clone, Debug)]
pub struct SessionService {
    pool: SqlitePool,
    jwt: Arc<JwtService>,
    config: Config,
    orders: OrderService,
}

impl SessionService {
    pub fn new(pool: SqlitePool, jwt: Arc<JwtService>, config: Config, orders: OrderService) -> Self {
        Self {
            pool,
            jwt,
            config,
            orders,
        }
    }

    /// 为桌台签发扫码点餐令牌
    pub async fn issue_table_qr(&self, table_id: i64) -> AppResult<TableQrCode> {
        let table = self.find_usable_table(table_id).await?;
        let (token, expires_at) = self
            .jwt
            .generate_table_qr_token(table.id, self.config.qr_token_ttl_minutes)
            .map_err(|e| AppError::internal(format!("Failed to sign QR token: {e}")))?;

        tracing::info!(table_id, "Table QR token issued");
        Ok(TableQrCode {
            table_id: table.id,
            url: self.config.ordering_url(&token),
            token,
            expires_at,
        })
    }

    /// 扫码开台
    ///
    /// 同一事务内先关闭该桌已过期但仍 OPEN 的会话，再插入新会话。
    /// 明文密钥只在返回值里出现这一次。
    pub async fn init(&self, input: SessionInit) -> AppResult<SessionInitResponse> {
        let claims = self.jwt.validate_table_qr_token(&input.token).map_err(|e| {
            security_log!(WARN, "qr_token_rejected", error = %e);
            match e {
                JwtError::ExpiredToken => AppError::new(ErrorCode::QrTokenExpired),
                _ => AppError::new(ErrorCode::QrTokenInvalid),
            }
        })?;
        let table = self.find_usable_table(claims.table_id).await?;

        let secret = generate_session_secret();
        let secret_hash = hash_session_secret(&secret);
        let notes = normalize_optional_text(input.notes);
        let now = shared::util::now_millis();
        let expires_at = now + shared::util::minutes_to_millis(self.config.session_ttl_minutes);

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let closed = table_session::close_expired_for_table(&mut *tx, table.id, now).await?;
        let session = table_session::insert(
            &mut *tx,
            NewSession {
                table_id: table.id,
                secret_hash: &secret_hash,
                customer_count: input.customer_count,
                notes: notes.as_deref(),
                created_at: now,
                expires_at,
            },
        )
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::TableOccupied)
                .with_detail("table_id", table.id),
            other => other.into(),
        })?;
        tx.commit().await.map_err(|e| match RepoError::from(e) {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::TableOccupied),
            other => other.into(),
        })?;

        if closed > 0 {
            tracing::info!(table_id = table.id, closed, "Closed expired sessions before opening");
        }
        tracing::info!(session_id = session.id, table_id = table.id, "Table session opened");

        Ok(SessionInitResponse {
            session,
            table_name: table.name,
            secret,
        })
    }

    /// 员工修改会话 (人数、备注、关台)
    pub async fn update(&self, id: i64, input: SessionUpdate) -> AppResult<TableSessionDetail> {
        let current = self.get(id).await?.session;
        let notes = normalize_optional_text(input.notes);

        let closing = match input.status {
            None | Some(SessionStatus::Open) if current.status == SessionStatus::Open => false,
            Some(SessionStatus::Closed) if current.status == SessionStatus::Closed => {
                return Err(AppError::new(ErrorCode::SessionAlreadyClosed));
            }
            Some(target) => {
                current.status.transition_to(target)?;
                true
            }
            None => false,
        };

        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        if input.customer_count.is_some() || notes.is_some() {
            table_session::update_details(&mut *tx, id, input.customer_count, notes.as_deref())
                .await?;
        }
        if closing && !table_session::close_if_open(&mut *tx, id, None, now).await? {
            return Err(AppError::new(ErrorCode::SessionAlreadyClosed));
        }
        tx.commit().await.map_err(RepoError::from)?;

        if closing {
            tracing::info!(session_id = id, "Table session closed");
        }
        self.get(id).await
    }

    /// 关台: OPEN → CLOSED，重复关台返回 SessionAlreadyClosed
    pub async fn close(&self, id: i64, notes: Option<String>) -> AppResult<TableSessionDetail> {
        let current = self.get(id).await?.session;
        if current.status == SessionStatus::Closed {
            return Err(AppError::new(ErrorCode::SessionAlreadyClosed));
        }

        let notes = normalize_optional_text(notes);
        let now = shared::util::now_millis();
        if !table_session::close_if_open(&self.pool, id, notes.as_deref(), now).await? {
            return Err(AppError::new(ErrorCode::SessionAlreadyClosed));
        }

        tracing::info!(session_id = id, table_id = current.table_id, "Table session closed");
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> AppResult<TableSessionDetail> {
        table_session::find_detail(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))
    }

    pub async fn list(
        &self,
        filter: &SessionFilter,
        page: &PageQuery,
    ) -> AppResult<PaginatedResponse<TableSessionDetail>> {
        let (rows, total) = table_session::find_page(&self.pool, filter, page).await?;
        Ok(PaginatedResponse::from_query(rows, total, page))
    }

    /// 会话账单 (未取消订单之和)
    pub async fn bill(&self, id: i64, discount: f64) -> AppResult<SessionBill> {
        self.orders.session_bill(id, discount).await
    }

    async fn find_usable_table(&self, table_id: i64) -> AppResult<DiningTable> {
        let table = dining_table::find_by_id(&self.pool, table_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
        if !table.is_active {
            return Err(AppError::new(ErrorCode::TableInactive).with_detail("table_id", table_id));
        }
        Ok(table)
    }
}
