//! Send side of a peer connection
//!
//! Every accepted connection owns a bounded outbound queue. The transport
//! drains the queue into the socket; sessions keep a cloned [`PeerHandle`] so
//! that routing never awaits on another peer's socket. A peer that stops
//! reading loses frames once its queue is full instead of growing it.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Process-unique identifier of one accepted connection
pub type ConnectionId = u64;

/// Frames a single connection may have queued before new ones are dropped
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Receiving end of a connection's outbound queue
pub type OutboundReceiver = mpsc::Receiver<Outbound>;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Frames queued for delivery to a peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A text frame
    Text(String),
    /// Close the connection with a WebSocket close code
    Close { code: u16, reason: String },
}

/// Cloneable, best-effort sender for one connection
#[derive(Debug, Clone)]
pub struct PeerHandle {
    connection_id: ConnectionId,
    tx: mpsc::Sender<Outbound>,
}

impl PeerHandle {
    /// Create a handle and the receiver the transport drains
    pub fn channel() -> (Self, OutboundReceiver) {
        Self::with_capacity(OUTBOUND_QUEUE_CAPACITY)
    }

    /// Create a handle whose queue holds at most `capacity` frames
    pub fn with_capacity(capacity: usize) -> (Self, OutboundReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let connection_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        (Self { connection_id, tx }, rx)
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Queue a text frame; returns false if the connection is gone or backed up
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.enqueue(Outbound::Text(text.into()))
    }

    /// Queue a close frame; returns false if the connection is gone or backed up
    pub fn close(&self, code: u16, reason: impl Into<String>) -> bool {
        self.enqueue(Outbound::Close {
            code,
            reason: reason.into(),
        })
    }

    fn enqueue(&self, frame: Outbound) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(
                    connection_id = self.connection_id,
                    "Outbound queue full, dropping frame"
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}
