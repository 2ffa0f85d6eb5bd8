//! peerlink-core: signaling session manager for the peerlink relay
//!
//! Peers rendezvous under a shared session id and exchange WebRTC signaling
//! (SDP offers and answers, ICE candidates) and short text messages through
//! the relay until they can talk to each other directly.
//!
//! - **Protocol** - [`ClientMessage`] and [`ServerMessage`] describe the JSON
//!   envelopes exchanged over each connection
//! - **Sessions** - [`Session`] holds the members of one session and
//!   [`SessionRegistry`] maps session ids to live sessions
//! - **Connections** - [`SignalingConnection`] runs the per-connection state
//!   machine against a registry
//!
//! The crate is transport agnostic: a connection is a stream of [`Inbound`]
//! frames plus a [`PeerHandle`] whose queue the transport drains.

pub mod error;
pub mod handler;
pub mod protocol;
pub mod session;

pub use error::SignalError;
pub use handler::{CloseReason, Inbound, SignalingConnection};
pub use protocol::{
    CLOSE_PROTOCOL_ERROR, ClientMessage, DEFAULT_ROLE, JoinRequest, RelayEnvelope, RelayKind,
    ServerMessage,
};
pub use session::{
    ClientRecord, ConnectionId, OUTBOUND_QUEUE_CAPACITY, Outbound, OutboundReceiver, PeerHandle,
    Session, SessionRegistry, SessionSnapshot,
};
