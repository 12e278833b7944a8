//! 实时事件 WebSocket
//!
//! `GET /ws?topics=orders:staff,order:12,menu,tables`
//!
//! 不需要认证。未指定 topics 时接收全部事件。服务端每隔
//! `WS_PING_INTERVAL_SECS` 发送 Ping；客户端发来的文本只记录不处理。

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State, rejection::QueryRejection};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::Duration;

use crate::core::ServerState;
use crate::live::Subscription;
use crate::utils::AppError;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    topics: Option<String>,
}

pub async fn handle_ws(
    State(state): State<ServerState>,
    query: Result<Query<WsQuery>, QueryRejection>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<impl IntoResponse, AppError> {
    let query = super::query_params(query)?;
    let subscription = Subscription::parse(query.topics.as_deref())
        .map_err(|e| AppError::invalid_field("topics", e))?;
    let ws = ws.map_err(|e| AppError::validation(e.body_text()))?;

    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, subscription)))
}

async fn ws_session(socket: WebSocket, state: ServerState, subscription: Subscription) {
    let (mut sink, mut stream) = socket.split();
    let (connection_id, mut events) = state.broadcaster.register(subscription);
    tracing::info!(connection_id, "Live WS connected");

    let mut ping_interval =
        tokio::time::interval(Duration::from_secs(state.config.ws_ping_interval_secs));
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = events.recv() => {
                match event {
                    Some(payload) => {
                        if sink.send(Message::Text(payload.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    // pruned by the broadcaster
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(connection_id, text = %text.as_str(), "Ignoring inbound WS text");
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection_id, error = %e, "Live WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.broadcaster.unregister(connection_id);
    tracing::info!(connection_id, "Live WS disconnected");
}
