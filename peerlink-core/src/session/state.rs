//! A signaling session and its members
//!
//! The membership map is guarded by a per-session lock. Every operation that
//! sends copies the handles it needs while holding the lock and sends after
//! releasing it, so a slow or dead peer never blocks membership changes.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::protocol::ServerMessage;

use super::handle::{ConnectionId, PeerHandle};
use super::record::ClientRecord;

/// Peers that joined under one session id
#[derive(Debug)]
pub struct Session {
    id: String,
    members: Mutex<HashMap<String, ClientRecord>>,
}

impl Session {
    /// Create an empty session
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            members: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Insert a member, replacing any record with the same client id
    ///
    /// Returns the superseded record. Its connection is left open.
    pub fn add_member(
        &self,
        client_id: impl Into<String>,
        role: impl Into<String>,
        handle: PeerHandle,
    ) -> Option<ClientRecord> {
        self.insert(ClientRecord::new(client_id, role, handle))
    }

    pub(crate) fn insert(&self, record: ClientRecord) -> Option<ClientRecord> {
        self.members
            .lock()
            .insert(record.client_id.clone(), record)
    }

    /// Remove a member; absent ids are ignored
    pub fn remove_member(&self, client_id: &str) -> Option<ClientRecord> {
        self.members.lock().remove(client_id)
    }

    /// Remove a member only if the record was registered by `connection_id`
    pub(crate) fn remove_member_owned_by(
        &self,
        client_id: &str,
        connection_id: ConnectionId,
    ) -> bool {
        let mut members = self.members.lock();
        match members.get(client_id) {
            Some(record) if record.connection_id() == connection_id => {
                members.remove(client_id);
                true
            }
            _ => false,
        }
    }

    /// Current client ids, sorted
    pub fn peer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.members.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Role of a member, if present
    pub fn role_of(&self, client_id: &str) -> Option<String> {
        self.members
            .lock()
            .get(client_id)
            .map(|record| record.role.clone())
    }

    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Send the current peer list to every member
    ///
    /// Returns how many members the notification was queued for. A dead
    /// member is skipped without affecting the others. Queueing happens
    /// under the lock so every member sees broadcasts in membership order;
    /// the queues are unbounded, so nothing here waits on the network.
    pub fn broadcast_peers(&self) -> usize {
        let members = self.members.lock();
        let mut peers: Vec<String> = members.keys().cloned().collect();
        peers.sort();
        let payload = ServerMessage::Peers { peers }.to_json();

        let delivered = members
            .values()
            .filter(|record| record.handle.send_text(payload.as_str()))
            .count();

        trace!(
            session_id = %self.id,
            delivered,
            members = members.len(),
            "Broadcast peer list"
        );
        delivered
    }

    /// Send a JSON payload to one member
    ///
    /// Returns false if the member is absent or its connection is gone.
    pub fn send_to(&self, client_id: &str, payload: &Value) -> bool {
        self.send_text(client_id, &payload.to_string())
    }

    /// Send a raw text frame to one member
    pub fn send_text(&self, client_id: &str, text: &str) -> bool {
        let handle = self
            .members
            .lock()
            .get(client_id)
            .map(|record| record.handle.clone());

        match handle {
            Some(handle) => handle.send_text(text),
            None => {
                debug!(session_id = %self.id, client_id, "Dropping message for absent peer");
                false
            }
        }
    }
}
