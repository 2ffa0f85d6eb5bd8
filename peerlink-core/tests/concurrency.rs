//! Concurrency tests for the signaling handler
//!
//! These tests drive many connections at once on a multi-threaded runtime:
//! - Concurrent joins converge on the same final peer list for every member
//! - Concurrent departures leave no empty session behind
//! - Different sessions proceed independently

use std::sync::Arc;
use std::time::Duration;

use peerlink_core::{
    CloseReason, Inbound, Outbound, OutboundReceiver, PeerHandle, SessionRegistry,
    SignalingConnection,
};
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;

struct Client {
    frames: UnboundedSender<Result<Inbound, String>>,
    outbound: OutboundReceiver,
    task: JoinHandle<CloseReason>,
}

fn spawn_client(registry: &Arc<SessionRegistry>, session_id: &str, client_id: &str) -> Client {
    let (handle, outbound) = PeerHandle::channel();
    let (frames, rx) = mpsc::unbounded_channel();
    let connection = SignalingConnection::new(Arc::clone(registry), session_id, handle);
    let task = tokio::spawn(connection.run(UnboundedReceiverStream::new(rx)));

    frames
        .send(Ok(Inbound::Text(
            json!({"type": "join", "clientId": client_id}).to_string(),
        )))
        .unwrap();

    Client {
        frames,
        outbound,
        task,
    }
}

/// Drain until the outbound queue has been quiet for a while; return the last peer list seen
async fn last_peer_list(outbound: &mut OutboundReceiver) -> Vec<String> {
    let mut last = Vec::new();
    while let Ok(Some(message)) =
        tokio::time::timeout(Duration::from_millis(200), outbound.recv()).await
    {
        if let Outbound::Text(text) = message {
            let value: Value = serde_json::from_str(&text).unwrap();
            if value["type"] == "peers" {
                last = serde_json::from_value(value["peers"].clone()).unwrap();
            }
        }
    }
    last.sort();
    last
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_converge_on_full_peer_list() {
    let registry = Arc::new(SessionRegistry::new());
    let ids: Vec<String> = (0..32).map(|i| format!("client-{:02}", i)).collect();

    let mut clients: Vec<Client> = ids
        .iter()
        .map(|id| spawn_client(&registry, "crowded", id))
        .collect();

    for client in &mut clients {
        assert_eq!(last_peer_list(&mut client.outbound).await, ids);
    }
    assert_eq!(registry.get("crowded").unwrap().len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_departures_remove_the_session() {
    let registry = Arc::new(SessionRegistry::new());
    let clients: Vec<Client> = (0..16)
        .map(|i| spawn_client(&registry, "leaving", &format!("c{}", i)))
        .collect();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(registry.member_count(), 16);

    let mut tasks = Vec::new();
    for (i, client) in clients.into_iter().enumerate() {
        if i % 2 == 0 {
            client
                .frames
                .send(Ok(Inbound::Text(json!({"type": "leave"}).to_string())))
                .unwrap();
        } else {
            drop(client.frames);
        }
        tasks.push(client.task);
    }

    for task in tasks {
        let reason = task.await.unwrap();
        assert!(matches!(
            reason,
            CloseReason::Left | CloseReason::Disconnected
        ));
    }

    assert_eq!(registry.session_count(), 0);
    assert_eq!(registry.member_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sessions_churn_independently() {
    let registry = Arc::new(SessionRegistry::new());

    let mut handles = Vec::new();
    for s in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let session_id = format!("room-{}", s);
            let mut a = spawn_client(&registry, &session_id, "a");
            let mut b = spawn_client(&registry, &session_id, "b");

            assert_eq!(last_peer_list(&mut a.outbound).await, vec!["a", "b"]);
            assert_eq!(last_peer_list(&mut b.outbound).await, vec!["a", "b"]);

            drop(b.frames);
            b.task.await.unwrap();
            assert_eq!(last_peer_list(&mut a.outbound).await, vec!["a"]);

            drop(a.frames);
            a.task.await.unwrap();
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(registry.session_count(), 0);
}
