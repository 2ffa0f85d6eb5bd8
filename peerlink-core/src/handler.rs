//! Per-connection signaling state machine
//!
//! A connection moves `Connecting → Joined → Closed`. The first text frame
//! must be a `join`; anything else closes the connection with
//! [`CLOSE_PROTOCOL_ERROR`] before it touches any session. Once joined, the
//! connection relays signaling payloads to named peers until it leaves,
//! disconnects or fails. Departure is tied to a drop guard, so it runs on
//! every exit path including task cancellation.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::SignalError;
use crate::protocol::{
    CLOSE_PROTOCOL_ERROR, ClientMessage, DEFAULT_ROLE, JoinRequest, RelayEnvelope, ServerMessage,
};
use crate::session::{ClientRecord, ConnectionId, PeerHandle, Session, SessionRegistry};

/// A frame read from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A text frame carrying a JSON message
    Text(String),
    /// A binary frame; the protocol is text only
    Binary,
    /// Transport-level ping or pong, answered by the transport itself
    Control,
    /// The peer sent a close frame
    Close,
}

/// Why a connection reached `Closed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The handshake was violated; closed with a protocol error code
    ProtocolViolation(String),
    /// The peer sent `leave`
    Left,
    /// The transport closed or ended
    Disconnected,
    /// Reading from the transport failed
    TransportError(String),
}

/// Drives one accepted connection against a session registry
#[derive(Debug)]
pub struct SignalingConnection {
    registry: Arc<SessionRegistry>,
    session_id: String,
    client_hint: Option<String>,
    handle: PeerHandle,
}

impl SignalingConnection {
    /// Create a handler for a connection addressed to `session_id`
    pub fn new(
        registry: Arc<SessionRegistry>,
        session_id: impl Into<String>,
        handle: PeerHandle,
    ) -> Self {
        Self {
            registry,
            session_id: session_id.into(),
            client_hint: None,
            handle,
        }
    }

    /// Client id to use when the join message does not carry one
    ///
    /// Browsers pass it as a query parameter on the upgrade URL.
    pub fn with_client_hint(mut self, hint: Option<String>) -> Self {
        self.client_hint = hint.filter(|h| !h.is_empty());
        self
    }

    /// Run the connection to completion
    #[instrument(
        name = "signaling::connection",
        skip_all,
        fields(session_id = %self.session_id, connection_id = self.handle.connection_id())
    )]
    pub async fn run<S, E>(self, mut incoming: S) -> CloseReason
    where
        S: Stream<Item = Result<Inbound, E>> + Unpin,
        E: Display,
    {
        let join = match await_join(&mut incoming).await {
            Ok(join) => join,
            Err(e) if e.is_protocol_violation() => {
                warn!("Rejecting connection: {}", e);
                self.handle.close(CLOSE_PROTOCOL_ERROR, e.to_string());
                return CloseReason::ProtocolViolation(e.to_string());
            }
            Err(SignalError::Transport(e)) => return CloseReason::TransportError(e),
            Err(_) => return CloseReason::Disconnected,
        };

        let client_id = join
            .client_id
            .or(self.client_hint)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let role = join.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());

        let record = ClientRecord::new(client_id.clone(), role.clone(), self.handle.clone());
        let session = self.registry.join(&self.session_id, record);
        let membership = Membership {
            registry: Arc::clone(&self.registry),
            session: Arc::clone(&session),
            client_id: client_id.clone(),
            connection_id: self.handle.connection_id(),
        };

        info!(%client_id, %role, "Client joined");
        session.broadcast_peers();

        let reason = dispatch_loop(&mut incoming, &session, &client_id, &self.handle).await;

        info!(%client_id, ?reason, "Client departed");
        drop(membership);
        reason
    }
}

/// Wait for the first text frame and require it to be a join
async fn await_join<S, E>(incoming: &mut S) -> Result<JoinRequest, SignalError>
where
    S: Stream<Item = Result<Inbound, E>> + Unpin,
    E: Display,
{
    loop {
        match incoming.next().await {
            Some(Ok(Inbound::Text(text))) => {
                return match ClientMessage::parse(&text)? {
                    ClientMessage::Join(join) => Ok(join),
                    other => Err(SignalError::NotJoin(other.kind().to_string())),
                };
            }
            Some(Ok(Inbound::Binary)) => {
                return Err(SignalError::NotJoin("binary frame".to_string()));
            }
            Some(Ok(Inbound::Control)) => continue,
            Some(Ok(Inbound::Close)) | None => return Err(SignalError::ClosedBeforeJoin),
            Some(Err(e)) => return Err(SignalError::Transport(e.to_string())),
        }
    }
}

/// Relay messages for a joined client until it leaves or disconnects
async fn dispatch_loop<S, E>(
    incoming: &mut S,
    session: &Session,
    client_id: &str,
    handle: &PeerHandle,
) -> CloseReason
where
    S: Stream<Item = Result<Inbound, E>> + Unpin,
    E: Display,
{
    loop {
        let text = match incoming.next().await {
            Some(Ok(Inbound::Text(text))) => text,
            Some(Ok(Inbound::Binary | Inbound::Control)) => continue,
            Some(Ok(Inbound::Close)) | None => return CloseReason::Disconnected,
            Some(Err(e)) => {
                debug!("Transport error: {}", e);
                return CloseReason::TransportError(e.to_string());
            }
        };

        let message = match ClientMessage::parse(&text) {
            Ok(message) => message,
            Err(e) => {
                debug!("Discarding frame: {}", e);
                continue;
            }
        };

        match message {
            ClientMessage::Relay(envelope) => relay(session, client_id, envelope),
            ClientMessage::Leave => return CloseReason::Left,
            ClientMessage::Ping => {
                handle.send_text(ServerMessage::Pong.to_json());
            }
            ClientMessage::Join(_) | ClientMessage::Unknown(_) => {
                debug!(kind = message.kind(), "Ignoring message");
            }
        }
    }
}

fn relay(session: &Session, from: &str, envelope: RelayEnvelope) {
    let Some(to) = envelope.to.clone() else {
        debug!(kind = envelope.kind.as_str(), "Dropping relay without target");
        return;
    };

    let kind = envelope.kind.as_str();
    let delivered = session.send_to(&to, &envelope.into_forwarded(from));
    debug!(kind, %to, delivered, "Relayed message");
}

/// Session membership held by a joined connection
///
/// Dropping it removes the member, drops the session from the registry if it
/// became empty, and tells the remaining members.
struct Membership {
    registry: Arc<SessionRegistry>,
    session: Arc<Session>,
    client_id: String,
    connection_id: ConnectionId,
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.registry
            .depart(&self.session, &self.client_id, self.connection_id);
        self.session.broadcast_peers();
    }
}
