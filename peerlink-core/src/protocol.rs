//! Signaling wire protocol
//!
//! Client messages are JSON objects discriminated by a `type` field. Relayed
//! messages are kept as raw JSON objects so that SDP and ICE payloads reach
//! the target peer exactly as the sender wrote them, plus a `from` field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SignalError;

/// WebSocket close code sent when the handshake is violated
pub const CLOSE_PROTOCOL_ERROR: u16 = 1002;

/// Role assigned when a join does not name one
pub const DEFAULT_ROLE: &str = "unknown";

/// Signaling payloads the relay forwards to a named peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    SdpOffer,
    SdpAnswer,
    IceCandidate,
    Text,
}

impl RelayKind {
    /// Map a wire `type` to a relay kind, if it is routable
    pub fn from_type(kind: &str) -> Option<Self> {
        match kind {
            "sdp-offer" => Some(Self::SdpOffer),
            "sdp-answer" => Some(Self::SdpAnswer),
            "ice-candidate" => Some(Self::IceCandidate),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SdpOffer => "sdp-offer",
            Self::SdpAnswer => "sdp-answer",
            Self::IceCandidate => "ice-candidate",
            Self::Text => "text",
        }
    }
}

/// Contents of a `join` message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    /// Requested client id; empty strings are treated as absent
    pub client_id: Option<String>,
    /// Requested role
    pub role: Option<String>,
}

/// A relayable message: the original envelope plus its routing data
#[derive(Debug, Clone, PartialEq)]
pub struct RelayEnvelope {
    pub kind: RelayKind,
    /// Target client id, if the sender named one
    pub to: Option<String>,
    /// Every field of the original message, untouched
    pub fields: Map<String, Value>,
}

impl RelayEnvelope {
    /// Consume the envelope into the payload delivered to the target
    ///
    /// `from` always names the true sender, replacing any value the sender set.
    pub fn into_forwarded(self, from: &str) -> Value {
        let mut fields = self.fields;
        fields.insert("from".to_string(), Value::String(from.to_string()));
        Value::Object(fields)
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Register with the session; must be the first message
    Join(JoinRequest),
    /// Offer, answer, ICE candidate or text for a single peer
    Relay(RelayEnvelope),
    /// Graceful departure
    Leave,
    /// Keepalive, answered with a pong
    Ping,
    /// Any other `type`, ignored by the relay
    Unknown(String),
}

impl ClientMessage {
    /// Parse a text frame into a client message
    pub fn parse(text: &str) -> Result<Self, SignalError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = value else {
            return Err(SignalError::NotAnObject);
        };

        let kind = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or(SignalError::MissingType)?
            .to_string();

        let message = match kind.as_str() {
            "join" => ClientMessage::Join(JoinRequest {
                client_id: non_empty_str(&fields, "clientId"),
                role: non_empty_str(&fields, "role"),
            }),
            "leave" => ClientMessage::Leave,
            "ping" => ClientMessage::Ping,
            other => match RelayKind::from_type(other) {
                Some(relay_kind) => ClientMessage::Relay(RelayEnvelope {
                    kind: relay_kind,
                    to: non_empty_str(&fields, "to"),
                    fields,
                }),
                None => ClientMessage::Unknown(kind),
            },
        };

        Ok(message)
    }

    /// The wire `type` of this message
    pub fn kind(&self) -> &str {
        match self {
            ClientMessage::Join(_) => "join",
            ClientMessage::Relay(envelope) => envelope.kind.as_str(),
            ClientMessage::Leave => "leave",
            ClientMessage::Ping => "ping",
            ClientMessage::Unknown(kind) => kind,
        }
    }
}

fn non_empty_str(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Current members of the session
    Peers {
        /// Client ids, sorted
        peers: Vec<String>,
    },

    /// Reply to a ping
    Pong,
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        // Serializing a tagged enum of strings cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
