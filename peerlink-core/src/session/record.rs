//! Client records held by a session

use super::handle::{ConnectionId, PeerHandle};

/// One joined peer: its id, its free-form role and where to send to it
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub client_id: String,
    pub role: String,
    pub handle: PeerHandle,
}

impl ClientRecord {
    pub fn new(client_id: impl Into<String>, role: impl Into<String>, handle: PeerHandle) -> Self {
        Self {
            client_id: client_id.into(),
            role: role.into(),
            handle,
        }
    }

    /// Connection that registered this record
    pub fn connection_id(&self) -> ConnectionId {
        self.handle.connection_id()
    }
}
