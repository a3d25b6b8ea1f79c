use std::collections::HashMap;

use serde_json::json;
use shared::lifecycle::StatusMachine;
use shared::models::{
    KitchenQueueItem, MenuItem, NotificationType, Order, OrderBill, OrderCreate, OrderDetail,
    OrderFilter, OrderItem, OrderItemInput, OrderItemStatus, OrderStatus, OrderType, SessionBill,
    SessionStatus,
};
use shared::pagination::{PageQuery, PaginatedResponse};
use sqlx::SqlitePool;

use super::bill;
use crate::db::repository::order::{self, NewOrder, OrderRow};
use crate::db::repository::{RepoError, menu_item, table_session};
use crate::notifications::NotificationService;
use crate::utils::validation::normalize_optional_text;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 已校验的下单行: 菜品快照 + 数量
struct ResolvedLine {
    menu_item: MenuItem,
    quantity: i32,
    notes: Option<String>,
}

/// 订单服务
///
/// 读校验 (会话、菜品) 在事务外完成，事务内只做写入，
/// 这样写锁在事务第一条语句就拿到，不会在读锁升级时撞上 SQLITE_BUSY。
#[derive(Clone, Debug)]
pub struct OrderService {
    pool: SqlitePool,
    notifications: NotificationService,
    tax_rate: f64,
}

impl OrderService {
    pub fn new(pool: SqlitePool, notifications: NotificationService, tax_rate: f64) -> Self {
        Self {
            pool,
            notifications,
            tax_rate,
        }
    }

    // ========== 下单 ==========

    /// 员工下单 (堂食需要 OPEN 会话，外带不能带会话)
    pub async fn create_order(
        &self,
        input: OrderCreate,
        created_by: Option<i64>,
    ) -> AppResult<OrderDetail> {
        match (input.order_type, input.session_id) {
            (OrderType::DineIn, None) => {
                return Err(AppError::with_message(
                    ErrorCode::OrderTypeMismatch,
                    "Dine-in orders require a table session",
                ));
            }
            (OrderType::Takeaway, Some(_)) => {
                return Err(AppError::with_message(
                    ErrorCode::OrderTypeMismatch,
                    "Takeaway orders cannot belong to a table session",
                ));
            }
            (OrderType::DineIn, Some(session_id)) => self.require_open_session(session_id).await?,
            (OrderType::Takeaway, None) => {}
        }

        self.place(
            input.session_id,
            input.order_type,
            &input.items,
            input.notes.as_deref(),
            created_by,
        )
        .await
    }

    /// 顾客扫码下单，会话已由网关校验
    pub async fn create_guest_order(
        &self,
        session_id: i64,
        items: &[OrderItemInput],
        notes: Option<&str>,
    ) -> AppResult<OrderDetail> {
        self.place(Some(session_id), OrderType::DineIn, items, notes, None)
            .await
    }

    async fn place(
        &self,
        session_id: Option<i64>,
        order_type: OrderType,
        items: &[OrderItemInput],
        notes: Option<&str>,
        created_by: Option<i64>,
    ) -> AppResult<OrderDetail> {
        let lines = self.resolve_lines(items).await?;
        let notes = normalize_optional_text(notes.map(str::to_owned));
        let now = shared::util::now_millis();

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let created = order::insert_order(
            &mut *tx,
            NewOrder {
                session_id,
                order_type,
                notes: notes.as_deref(),
                created_by,
                now,
            },
        )
        .await?;
        for line in &lines {
            order::insert_item(
                &mut *tx,
                created.id,
                &line.menu_item,
                line.quantity,
                line.notes.as_deref(),
                now,
            )
            .await?;
        }
        tx.commit().await.map_err(RepoError::from)?;

        let detail = self.get(created.id).await?;
        tracing::info!(
            order_id = detail.order.id,
            session_id = ?session_id,
            items = detail.items.len(),
            "Order created"
        );

        self.notifications
            .emit(
                NotificationType::NewOrder,
                "New order",
                &order_summary(&detail, "New order"),
                json!({
                    "order_id": detail.order.id,
                    "session_id": session_id,
                    "table_name": detail.table_name,
                    "item_count": detail.items.len(),
                }),
            )
            .await;

        Ok(detail)
    }

    /// 加菜 (订单未完成/未取消)
    pub async fn add_items(&self, order_id: i64, items: &[OrderItemInput]) -> AppResult<OrderDetail> {
        let current = self.find_order(order_id).await?;
        ensure_not_terminal(&current)?;

        let lines = self.resolve_lines(items).await?;
        let now = shared::util::now_millis();

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        // 第一条写语句同时确认订单仍未终结
        let still_open = order::touch_if_active(&mut *tx, order_id, now).await?;
        if !still_open {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                "Order was closed concurrently",
            ));
        }
        for line in &lines {
            order::insert_item(
                &mut *tx,
                order_id,
                &line.menu_item,
                line.quantity,
                line.notes.as_deref(),
                now,
            )
            .await?;
        }
        tx.commit().await.map_err(RepoError::from)?;

        let detail = self.get(order_id).await?;
        self.notifications
            .emit(
                NotificationType::NewOrder,
                "Items added",
                &order_summary(&detail, "Items added to order"),
                json!({
                    "order_id": order_id,
                    "session_id": detail.order.session_id,
                    "table_name": detail.table_name,
                    "added": lines.len(),
                }),
            )
            .await;
        Ok(detail)
    }

    /// 顾客加菜: 只能操作本会话的订单
    pub async fn add_guest_items(
        &self,
        session_id: i64,
        order_id: i64,
        items: &[OrderItemInput],
    ) -> AppResult<OrderDetail> {
        let current = self.find_order(order_id).await?;
        if current.session_id != Some(session_id) {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }
        self.add_items(order_id, items).await
    }

    /// 校验所有行: 数量 ≥ 1，菜品存在且可售。任意一行失败整单失败。
    async fn resolve_lines(&self, items: &[OrderItemInput]) -> AppResult<Vec<ResolvedLine>> {
        if items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let mut cache: HashMap<i64, MenuItem> = HashMap::new();
        let mut lines = Vec::with_capacity(items.len());
        for (index, input) in items.iter().enumerate() {
            if input.quantity < 1 {
                return Err(AppError::new(ErrorCode::InvalidQuantity)
                    .with_detail("index", index)
                    .with_detail("quantity", input.quantity));
            }

            let menu_item = match cache.get(&input.menu_item_id) {
                Some(item) => item.clone(),
                None => {
                    let item = menu_item::find_by_id(&self.pool, input.menu_item_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::new(ErrorCode::MenuItemNotFound)
                                .with_detail("menu_item_id", input.menu_item_id)
                        })?;
                    cache.insert(item.id, item.clone());
                    item
                }
            };

            if !menu_item.is_available {
                return Err(AppError::with_message(
                    ErrorCode::MenuItemUnavailable,
                    format!("{} is not available", menu_item.name),
                )
                .with_detail("menu_item_id", menu_item.id));
            }

            lines.push(ResolvedLine {
                menu_item,
                quantity: input.quantity,
                notes: normalize_optional_text(input.notes.clone()),
            });
        }
        Ok(lines)
    }

    async fn require_open_session(&self, session_id: i64) -> AppResult<()> {
        let session = table_session::find_by_id(&self.pool, session_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;
        if session.status != SessionStatus::Open {
            return Err(AppError::new(ErrorCode::SessionNotOpen));
        }
        if session.expires_at <= shared::util::now_millis() {
            return Err(AppError::new(ErrorCode::SessionExpired));
        }
        Ok(())
    }

    // ========== 状态 ==========

    /// 订单状态前进
    ///
    /// - 进入需要明细的状态时订单不能为空 (OrderEmpty)
    /// - 完成时所有菜品必须已上桌 (OrderHasUnservedItems)
    pub async fn update_order_status(&self, order_id: i64, target: OrderStatus) -> AppResult<OrderDetail> {
        let current = self.find_order(order_id).await?;
        ensure_not_terminal(&current)?;
        let target = current.status.transition_to(target)?;

        let (total, unserved) = order::count_items(&self.pool, order_id).await?;
        if target.requires_items() && total == 0 {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        if target == OrderStatus::Completed && unserved > 0 {
            return Err(AppError::new(ErrorCode::OrderHasUnservedItems)
                .with_detail("unserved_items", unserved));
        }

        let now = shared::util::now_millis();
        if !order::update_status_if(&self.pool, order_id, current.status, target, now).await? {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                "Order status changed concurrently",
            )
            .with_detail("from", current.status.as_str())
            .with_detail("to", target.as_str()));
        }

        tracing::info!(
            order_id,
            from = current.status.as_str(),
            to = target.as_str(),
            "Order status updated"
        );
        self.get(order_id).await
    }

    /// 菜品状态前进 (PENDING → PREPARING → READY → SERVED)
    pub async fn update_item_status(&self, item_id: i64, target: OrderItemStatus) -> AppResult<OrderItem> {
        let item = order::find_item(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
        let parent = self.find_order(item.order_id).await?;
        ensure_not_terminal(&parent)?;
        let target = item.status.transition_to(target)?;

        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        if !order::update_item_status_if(&mut *tx, item_id, item.status, target, now).await? {
            return Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                "Item status changed concurrently",
            )
            .with_detail("from", item.status.as_str())
            .with_detail("to", target.as_str()));
        }
        order::touch(&mut *tx, item.order_id, now).await?;
        tx.commit().await.map_err(RepoError::from)?;

        let updated = order::find_item(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;

        if target == OrderItemStatus::Ready {
            let table = self.get(item.order_id).await.ok().and_then(|d| d.table_name);
            let message = match &table {
                Some(name) => format!("{} x{} is ready for {name}", updated.name, updated.quantity),
                None => format!("{} x{} is ready", updated.name, updated.quantity),
            };
            self.notifications
                .emit(
                    NotificationType::OrderReady,
                    "Order ready",
                    &message,
                    json!({
                        "order_id": updated.order_id,
                        "item_id": updated.id,
                        "table_name": table,
                    }),
                )
                .await;
        }

        Ok(updated)
    }

    // ========== 查询 ==========

    async fn find_order(&self, order_id: i64) -> AppResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
    }

    pub async fn get(&self, order_id: i64) -> AppResult<OrderDetail> {
        let row = order::find_row_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        let items = order::find_items(&self.pool, order_id).await?;
        Ok(into_detail(row, items))
    }

    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: &PageQuery,
    ) -> AppResult<PaginatedResponse<OrderDetail>> {
        let (rows, total) = order::find_page(&self.pool, filter, page).await?;
        let details = self.attach_items(rows).await?;
        Ok(PaginatedResponse::from_query(details, total, page))
    }

    /// 某会话的订单 (顾客视图包含已取消订单)
    pub async fn list_by_session(&self, session_id: i64) -> AppResult<Vec<OrderDetail>> {
        let rows = order::find_by_session(&self.pool, session_id, true).await?;
        self.attach_items(rows).await
    }

    /// 顾客查看单个订单: 不属于本会话按不存在处理
    pub async fn get_for_session(&self, session_id: i64, order_id: i64) -> AppResult<OrderDetail> {
        let detail = self.get(order_id).await?;
        if detail.order.session_id != Some(session_id) {
            return Err(AppError::new(ErrorCode::OrderNotFound));
        }
        Ok(detail)
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> AppResult<Vec<OrderDetail>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.order.id).collect();
        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in order::find_items_for_orders(&self.pool, &ids).await? {
            by_order.entry(item.order_id).or_default().push(item);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.order.id).unwrap_or_default();
                into_detail(row, items)
            })
            .collect())
    }

    pub async fn kitchen_queue(&self, status: Option<OrderItemStatus>) -> AppResult<Vec<KitchenQueueItem>> {
        Ok(order::kitchen_queue(&self.pool, status).await?)
    }

    // ========== 账单 ==========

    pub async fn order_bill(&self, order_id: i64, discount: f64) -> AppResult<OrderBill> {
        self.find_order(order_id).await?;
        let items = order::find_items(&self.pool, order_id).await?;
        bill::order_bill(order_id, &items, self.tax_rate, discount)
    }

    /// 会话账单: 所有未取消订单
    pub async fn session_bill(&self, session_id: i64, discount: f64) -> AppResult<SessionBill> {
        table_session::find_by_id(&self.pool, session_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;

        let rows = order::find_by_session(&self.pool, session_id, false).await?;
        let orders: Vec<(i64, Vec<OrderItem>)> = self
            .attach_items(rows)
            .await?
            .into_iter()
            .map(|d| (d.order.id, d.items))
            .collect();
        bill::session_bill(session_id, &orders, self.tax_rate, discount)
    }
}

fn into_detail(row: OrderRow, items: Vec<OrderItem>) -> OrderDetail {
    OrderDetail {
        order: row.order,
        table_id: row.table_id,
        table_name: row.table_name,
        items,
    }
}

fn ensure_not_terminal(order: &Order) -> AppResult<()> {
    match order.status {
        OrderStatus::Completed => Err(AppError::new(ErrorCode::OrderAlreadyCompleted)),
        OrderStatus::Cancelled => Err(AppError::new(ErrorCode::OrderAlreadyCancelled)),
        _ => Ok(()),
    }
}

fn order_summary(detail: &OrderDetail, prefix: &str) -> String {
    let quantity: i32 = detail.items.iter().map(|i| i.quantity).sum();
    match &detail.table_name {
        Some(table) => format!("{prefix} #{} for {table} ({quantity} items)", detail.order.id),
        None => format!("{prefix} #{} takeaway ({quantity} items)", detail.order.id),
    }
}
