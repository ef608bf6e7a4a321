//! WebSocket transport for the chat protocol.
//!
//! Each connection gets a session in the hub and an outbound channel.
//! The socket task forwards hub events to the wire and parses inbound
//! text frames into client events; anything unparseable is dropped.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::chat::{ClientEvent, ConnId};

use super::AppState;

/// WebSocket upgrade handler.
///
/// GET /ws
///
/// The connection starts unauthenticated; the client is expected to send
/// an `auth` event as its first message.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one WebSocket connection against the hub.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnId::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.hub.connect(conn_id, tx).await;

    tracing::debug!(conn = %conn_id, "WebSocket session started");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            // Forward hub events out to the client
            outbound = rx.recv() => {
                match outbound {
                    Some(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(conn = %conn_id, error = %e, "failed to encode event");
                            }
                        }
                    }
                    None => break,
                }
            }

            // Handle incoming WebSocket messages
            inbound = ws_receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => state.hub.handle_event(conn_id, event).await,
                            Err(e) => {
                                // Malformed events are dropped without a reply
                                tracing::debug!(conn = %conn_id, "ignoring malformed event: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::debug!(conn = %conn_id, "WebSocket closed by client");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(conn = %conn_id, "WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.hub.disconnect(conn_id).await;
    tracing::debug!(conn = %conn_id, "WebSocket session ended");
}
