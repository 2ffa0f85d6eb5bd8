//! WebSocket connection handling
//!
//! Each upgraded socket is split in two: a writer task drains the
//! connection's outbound queue into the socket, while the signaling state
//! machine consumes inbound frames.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use peerlink_core::{Inbound, Outbound, OutboundReceiver, PeerHandle, SignalingConnection};
use serde::Deserialize;
use tracing::{debug, info};

use crate::AppState;

/// Query parameters accepted on the signaling endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    /// Client id used when the join message omits one
    #[serde(default)]
    pub client_id: Option<String>,
}

/// WebSocket upgrade handler for `/api/ws/session/:session_id`
pub async fn session_ws(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    Query(query): Query<SessionQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id, query.client_id))
}

/// Handle a signaling WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session_id: String,
    client_hint: Option<String>,
) {
    let (sender, receiver) = socket.split();
    let (handle, outbound) = PeerHandle::channel();

    debug!(%session_id, connection_id = handle.connection_id(), "WebSocket client connected");

    let writer = tokio::spawn(forward_outbound(outbound, sender));

    let incoming = receiver.map(|frame| frame.map(inbound_from_message));
    let reason = SignalingConnection::new(Arc::clone(&state.registry), session_id.clone(), handle)
        .with_client_hint(client_hint)
        .run(incoming)
        .await;

    // The writer ends once every handle to this connection is dropped
    let _ = writer.await;

    info!(%session_id, ?reason, "WebSocket client disconnected");
}

/// Drain queued frames into the socket until the queue closes or a send fails
async fn forward_outbound(
    mut outbound: OutboundReceiver,
    mut sender: futures::stream::SplitSink<WebSocket, Message>,
) {
    while let Some(frame) = outbound.recv().await {
        match frame {
            Outbound::Text(text) => {
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Outbound::Close { code, reason } => {
                let close = CloseFrame {
                    code,
                    reason: reason.into(),
                };
                let _ = sender.send(Message::Close(Some(close))).await;
                return;
            }
        }
    }
    let _ = sender.close().await;
}

fn inbound_from_message(message: Message) -> Inbound {
    match message {
        Message::Text(text) => Inbound::Text(text.to_string()),
        Message::Binary(_) => Inbound::Binary,
        Message::Ping(_) | Message::Pong(_) => Inbound::Control,
        Message::Close(_) => Inbound::Close,
    }
}
