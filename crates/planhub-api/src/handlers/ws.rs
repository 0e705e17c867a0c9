//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use planhub_realtime::connection::authenticator::{AuthenticatedConnection, WsAuthenticator};
use planhub_realtime::message::types::OutboundMessage;

use crate::error::ApiError;
use crate::state::AppState;

/// Missed heartbeats after which a silent client is disconnected.
const IDLE_HEARTBEATS: u32 = 3;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrade
    let authenticator = WsAuthenticator::new(state.jwt_decoder.clone());
    let auth = authenticator.authenticate(&query.token)?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, auth, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, auth: AuthenticatedConnection, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) =
        state
            .realtime
            .connections
            .register(auth.user_id, auth.role, auth.username.clone());
    let conn_id = handle.id;

    info!(conn_id = %conn_id, user_id = auth.user_id, "WebSocket connection established");

    let heartbeat = Duration::from_secs(
        state
            .realtime
            .connections
            .config()
            .heartbeat_interval_seconds
            .max(1),
    );
    let writer_handle = handle.clone();

    // Outbound frames and keepalive pings
    let outbound_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(heartbeat);
        ticker.tick().await;

        loop {
            tokio::select! {
                frame = outbound_rx.recv() => {
                    let Some(frame) = frame else { break };
                    if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if !writer_handle.is_alive() {
                        break;
                    }
                    let idle = Utc::now() - writer_handle.last_activity().await;
                    if idle.to_std().is_ok_and(|idle| idle > heartbeat * IDLE_HEARTBEATS) {
                        info!(conn_id = %writer_handle.id, "Closing idle WebSocket connection");
                        break;
                    }
                    let ping = OutboundMessage::Ping {
                        timestamp: Utc::now().timestamp(),
                    };
                    let Ok(frame) = serde_json::to_string(&ping) else { continue };
                    if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = ws_tx.close().await;
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state
                    .realtime
                    .connections
                    .handle_inbound(&conn_id, text.as_str(), state.chat_service.as_ref())
                    .await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                debug!(conn_id = %conn_id, "Ignoring binary frame");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.realtime.connections.unregister(&conn_id);

    info!(conn_id = %conn_id, user_id = auth.user_id, "WebSocket connection closed");
}
