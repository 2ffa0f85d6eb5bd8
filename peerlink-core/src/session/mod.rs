//! Session membership
//!
//! A [`Session`] holds the peers that joined under one session id, and the
//! [`SessionRegistry`] maps session ids to live sessions.

pub mod handle;
pub mod record;
pub mod registry;
pub mod state;

pub use handle::{ConnectionId, OUTBOUND_QUEUE_CAPACITY, Outbound, OutboundReceiver, PeerHandle};
pub use record::ClientRecord;
pub use registry::{SessionRegistry, SessionSnapshot};
pub use state::Session;
