//! SessionRegistry for tracking live sessions
//!
//! Sessions are created lazily by the first join and removed as soon as the
//! last member departs. [`SessionRegistry::join`] and
//! [`SessionRegistry::depart`] run under the registry lock, so an emptiness
//! check can never remove a session a concurrent join is populating.
//!
//! Lock order is always registry, then session.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::handle::ConnectionId;
use super::record::ClientRecord;
use super::state::Session;

/// Point-in-time view of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub peers: Vec<String>,
}

/// Process-wide map from session id to session
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `session_id`, creating it if absent
    pub fn get_or_create(&self, session_id: &str) -> Arc<Session> {
        let mut sessions = self.sessions.lock();
        Self::entry(&mut sessions, session_id)
    }

    fn entry(sessions: &mut HashMap<String, Arc<Session>>, session_id: &str) -> Arc<Session> {
        let session = sessions.entry(session_id.to_string()).or_insert_with(|| {
            info!(session_id, "Session created");
            Arc::new(Session::new(session_id))
        });
        Arc::clone(session)
    }

    /// Look up a session without creating it
    pub fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().get(session_id).cloned()
    }

    /// Remove `session` if it has no members
    ///
    /// Only the exact session object is removed: if the id has since been
    /// recreated, the newer session is left alone. Returns whether the
    /// session was removed.
    pub fn remove_if_empty(&self, session: &Arc<Session>) -> bool {
        let mut sessions = self.sessions.lock();
        Self::remove_locked(&mut sessions, session)
    }

    fn remove_locked(
        sessions: &mut HashMap<String, Arc<Session>>,
        session: &Arc<Session>,
    ) -> bool {
        let registered = sessions
            .get(session.id())
            .is_some_and(|current| Arc::ptr_eq(current, session));

        if registered && session.is_empty() {
            sessions.remove(session.id());
            info!(session_id = %session.id(), "Session removed");
            true
        } else {
            false
        }
    }

    /// Register a client in a session, creating the session if needed
    ///
    /// A record with the same client id is overwritten.
    pub fn join(&self, session_id: &str, record: ClientRecord) -> Arc<Session> {
        let mut sessions = self.sessions.lock();
        let session = Self::entry(&mut sessions, session_id);
        if let Some(superseded) = session.insert(record) {
            info!(
                session_id,
                client_id = %superseded.client_id,
                connection_id = superseded.connection_id(),
                "Client id re-joined, previous connection superseded"
            );
        }
        session
    }

    /// Remove a client registered by `connection_id` and drop the session if empty
    ///
    /// Returns whether the session was removed from the registry.
    pub fn depart(
        &self,
        session: &Arc<Session>,
        client_id: &str,
        connection_id: ConnectionId,
    ) -> bool {
        let mut sessions = self.sessions.lock();
        session.remove_member_owned_by(client_id, connection_id);
        Self::remove_locked(&mut sessions, session)
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Number of members across all sessions
    pub fn member_count(&self) -> usize {
        self.sessions.lock().values().map(|s| s.len()).sum()
    }

    /// Snapshot of every session, sorted by id
    pub fn snapshot(&self) -> Vec<SessionSnapshot> {
        let sessions: Vec<Arc<Session>> = self.sessions.lock().values().cloned().collect();
        let mut snapshots: Vec<SessionSnapshot> = sessions
            .iter()
            .map(|session| SessionSnapshot {
                session_id: session.id().to_string(),
                peers: session.peer_ids(),
            })
            .collect();
        snapshots.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        snapshots
    }
}
