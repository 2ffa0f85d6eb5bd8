//! WebSocket module for signaling connections

mod connection;

pub use connection::{SessionQuery, session_ws};
