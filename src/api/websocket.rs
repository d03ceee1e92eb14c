//! WebSocket delta stream.
//!
//! Each connection to `GET /ws` registers a subscriber with the
//! broadcaster and receives every published delta as a JSON text frame.
//! The server pings every 30 s; three unanswered pings close the
//! connection. The subscriber is unregistered when the socket closes.
//!
//! Clients send nothing meaningful: incoming text frames are ignored.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::api::types::ApiContext;
use crate::broadcast::{Outgoing, SUBSCRIBER_BUFFER};
use crate::core_state::CoreState;

/// Ping interval.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Disconnect after this many unanswered pings.
const MAX_MISSED_PINGS: u32 = 3;

// ═══════════════════════════════════════════════════════════
// WsSessionState: heartbeat bookkeeping
// ═══════════════════════════════════════════════════════════

#[derive(Debug, PartialEq)]
pub(crate) enum HeartbeatAction {
    SendPing,
    Timeout,
}

pub(crate) struct WsSessionState {
    missed_pings: u32,
}

impl WsSessionState {
    fn new() -> Self {
        Self { missed_pings: 0 }
    }

    /// Any pong (or other traffic) proves the peer is alive.
    fn on_pong(&mut self) {
        self.missed_pings = 0;
    }

    fn on_heartbeat_tick(&mut self) -> HeartbeatAction {
        if self.missed_pings >= MAX_MISSED_PINGS {
            return HeartbeatAction::Timeout;
        }
        self.missed_pings += 1;
        HeartbeatAction::SendPing
    }
}

/// `GET /ws`: upgrade and start streaming deltas.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(ctx): State<ApiContext>) -> impl IntoResponse {
    let core = ctx.core.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, core))
}

/// Spawns a sender task that forwards deltas and control frames to the
/// socket, then runs the receive + heartbeat loop until disconnect.
async fn handle_ws(socket: WebSocket, core: Arc<CoreState>) {
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Outgoing>(SUBSCRIBER_BUFFER);
    let (ctrl_tx, mut ctrl_rx) = mpsc::channel::<Message>(4);

    let subscriber_id = match core.register_subscriber(tx) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Cannot register WebSocket subscriber");
            return;
        }
    };
    tracing::info!(subscriber_id = %subscriber_id, "WebSocket connected");

    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        loop {
            let frame = tokio::select! {
                delta = rx.recv() => match delta {
                    Some(delta) => match serde_json::to_string(delta.as_ref()) {
                        Ok(json) => Message::Text(json),
                        Err(e) => {
                            tracing::warn!(kind = delta.kind(), error = %e, "Cannot encode delta");
                            continue;
                        }
                    },
                    None => break,
                },
                ctrl = ctrl_rx.recv() => match ctrl {
                    Some(frame) => frame,
                    None => break,
                },
            };
            if sink.send(frame).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let mut session = WsSessionState::new();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // Consume initial immediate tick

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    Some(Ok(_)) => session.on_pong(),
                }
            }
            _ = heartbeat.tick() => {
                match session.on_heartbeat_tick() {
                    HeartbeatAction::SendPing => {
                        if ctrl_tx.send(Message::Ping(Vec::new())).await.is_err() {
                            break;
                        }
                    }
                    HeartbeatAction::Timeout => {
                        tracing::info!(
                            subscriber_id = %subscriber_id,
                            "{MAX_MISSED_PINGS} missed pings, disconnecting"
                        );
                        break;
                    }
                }
            }
        }
    }

    // Unregister first so the broadcaster drops its sender, which ends the
    // sender task together with the dropped control channel.
    if let Err(e) = core.unregister_subscriber(&subscriber_id) {
        tracing::warn!(error = %e, "Cannot unregister WebSocket subscriber");
    }
    drop(ctrl_tx);
    let _ = sender_handle.await;

    tracing::info!(subscriber_id = %subscriber_id, "WebSocket disconnected");
}
