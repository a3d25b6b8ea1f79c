//! Notification WebSocket endpoint
//!
//! GET /api/notifications/ws
//! Auth: `Authorization: Bearer <JWT>` 或 `?token=<JWT>` (浏览器 WebSocket 不支持自定义 headers)
//!
//! 协议:
//! - Server → Client: `notification`, `unreadCount`
//! - Client → Server: `markAsRead { id }`, `markAllAsRead`

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Uri};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::message::{ClientEvent, ServerEvent};
use tokio::time::Duration;

use crate::auth::middleware::authenticate_token;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// 握手前校验员工令牌
pub async fn handle_notifications_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
    uri: Uri,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let token = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .map(str::to_owned)
        .or(query.token);

    let Some(token) = token else {
        security_log!(WARN, "ws_auth_missing", uri = %uri.path());
        return Err(AppError::not_authenticated());
    };

    let user = authenticate_token(&state.get_jwt_service(), &token, &uri)?;
    Ok(ws.on_upgrade(move |socket| notification_ws_session(socket, state, user)))
}

async fn notification_ws_session(socket: WebSocket, state: ServerState, user: CurrentUser) {
    let (mut sink, mut stream) = socket.split();
    let notifications = state.notifications.clone();
    let hub = notifications.hub().clone();

    let mut rx = hub.register(user.id);
    tracing::info!(user_id = user.id, username = %user.username, "Notification WS connected");

    // 连接后先推一次未读数
    match notifications.unread_count(user.id).await {
        Ok(count) => {
            if send_event(&mut sink, &ServerEvent::UnreadCount { count }).await.is_err() {
                drop(rx);
                hub.prune(user.id);
                return;
            }
        }
        Err(e) => tracing::warn!(user_id = user.id, error = %e, "Failed to load unread count"),
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = rx.recv() => {
                match event {
                    Some(event) => {
                        if send_event(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(ClientEvent::MarkAsRead { id }) => {
                                // 未读数变化由服务经 hub 推回
                                if let Err(e) = notifications.mark_as_read(user.id, id).await {
                                    tracing::debug!(user_id = user.id, notification_id = id, error = %e, "markAsRead rejected");
                                }
                            }
                            Ok(ClientEvent::MarkAllAsRead) => {
                                if let Err(e) = notifications.mark_all_as_read(user.id).await {
                                    tracing::warn!(user_id = user.id, error = %e, "markAllAsRead failed");
                                }
                            }
                            Err(e) => {
                                tracing::debug!(user_id = user.id, error = %e, "Ignoring malformed client frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    drop(rx);
    hub.prune(user.id);
    tracing::info!(user_id = user.id, "Notification WS disconnected");
}

async fn send_event<S>(sink: &mut S, event: &ServerEvent) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
