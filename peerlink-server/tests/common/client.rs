//! WebSocket test client for signaling protocol tests
//!
//! Provides both low-level WsConnection and high-level TestPeer.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// What the server did next on a connection
#[derive(Debug)]
#[allow(dead_code)]
pub enum Frame {
    Text(String),
    Closed(Option<u16>),
}

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to a signaling session endpoint
    pub async fn connect(addr: SocketAddr, path: &str) -> Self {
        let url = format!("ws://{}{}", addr, path);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send JSON message
    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    /// Receive the next text or close frame
    pub async fn recv_frame(&mut self) -> Frame {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Frame::Text(text.to_string()),
                Some(Ok(Message::Close(frame))) => {
                    return Frame::Closed(frame.map(|f| u16::from(f.code)));
                }
                Some(Ok(_)) => continue,
                Some(Err(_)) | None => return Frame::Closed(None),
            }
        }
    }

    /// Receive and parse a JSON text message
    pub async fn recv_json(&mut self) -> Value {
        let frame = tokio::time::timeout(RECV_TIMEOUT, self.recv_frame())
            .await
            .expect("Timed out waiting for message");
        match frame {
            Frame::Text(text) => serde_json::from_str(&text).expect("Failed to parse JSON"),
            Frame::Closed(code) => panic!("WebSocket closed with {:?}", code),
        }
    }

    /// Receive with timeout, returns None if timeout
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<Frame> {
        tokio::time::timeout(duration, self.recv_frame()).await.ok()
    }

    /// Close the connection without sending leave
    pub async fn close(mut self) {
        let _ = self.sink.close().await;
    }
}

/// High-level signaling peer with helper methods
pub struct TestPeer {
    pub conn: WsConnection,
}

impl TestPeer {
    /// Connect to a session without joining
    #[allow(dead_code)]
    pub async fn connect(addr: SocketAddr, session_id: &str) -> Self {
        let conn = WsConnection::connect(addr, &format!("/api/ws/session/{}", session_id)).await;
        Self { conn }
    }

    /// Connect with a `client_id` query parameter
    #[allow(dead_code)]
    pub async fn connect_with_query(addr: SocketAddr, session_id: &str, client_id: &str) -> Self {
        let path = format!("/api/ws/session/{}?client_id={}", session_id, client_id);
        let conn = WsConnection::connect(addr, &path).await;
        Self { conn }
    }

    /// Connect and join, returns the peer list received after joining
    #[allow(dead_code)]
    pub async fn join(addr: SocketAddr, session_id: &str, client_id: &str) -> (Self, Vec<String>) {
        let mut peer = Self::connect(addr, session_id).await;
        peer.send(json!({"type": "join", "clientId": client_id, "role": "guest"}))
            .await;
        let peers = peer.recv_peers().await;
        (peer, peers)
    }

    /// Send a JSON message
    #[allow(dead_code)]
    pub async fn send(&mut self, msg: Value) {
        self.conn.send_json(&msg).await;
    }

    /// Receive next message
    #[allow(dead_code)]
    pub async fn recv(&mut self) -> Value {
        self.conn.recv_json().await
    }

    /// Receive a peers notification, returns the peer ids sorted
    #[allow(dead_code)]
    pub async fn recv_peers(&mut self) -> Vec<String> {
        let msg = self.recv().await;
        assert_eq!(msg["type"], "peers", "Expected peers but got: {}", msg);
        let mut peers: Vec<String> = serde_json::from_value(msg["peers"].clone()).unwrap();
        peers.sort();
        peers
    }

    /// Wait for the server to close the connection, returns the close code
    #[allow(dead_code)]
    pub async fn expect_close(&mut self) -> Option<u16> {
        match tokio::time::timeout(RECV_TIMEOUT, self.conn.recv_frame()).await {
            Ok(Frame::Closed(code)) => code,
            Ok(Frame::Text(text)) => panic!("Expected close but received: {}", text),
            Err(_) => panic!("Timed out waiting for close"),
        }
    }

    /// Assert no message received within duration
    #[allow(dead_code)]
    pub async fn expect_no_message(&mut self, duration: Duration) {
        if let Some(frame) = self.conn.recv_timeout(duration).await {
            panic!("Expected no message but received {:?}", frame);
        }
    }
}
