//! WebSocket layer — messages, subscriptions, events.
//!
//! The transport lives in `native.rs` (`tokio-tungstenite`, feature
//! `ws-native`). This module defines the shared message/event types.
//!
//! Outbound messages follow the exchange's combined-stream protocol:
//! `{"method":"SUBSCRIBE","params":["btcusdt@kline_1m@+08:00"],"id":"…"}`.
//! Inbound messages are either stream envelopes carrying a kline payload or
//! request acks, which carry no data and are ignored by consumers.

pub mod subscriptions;

#[cfg(feature = "ws-native")]
pub mod native;

use crate::domain::kline::wire::KlineEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use subscriptions::KlineStream;

// ─── Outbound messages ───────────────────────────────────────────────────────

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method")]
pub enum MessageOut {
    #[serde(rename = "SUBSCRIBE")]
    Subscribe { params: Vec<String>, id: Uuid },
    #[serde(rename = "UNSUBSCRIBE")]
    Unsubscribe { params: Vec<String>, id: Uuid },
}

impl MessageOut {
    /// Subscribe message for one kline stream, with a fresh request id.
    pub fn subscribe(stream: &KlineStream) -> Self {
        Self::Subscribe {
            params: vec![stream.stream_name()],
            id: Uuid::new_v4(),
        }
    }

    /// Unsubscribe message for one kline stream, with a fresh request id.
    pub fn unsubscribe(stream: &KlineStream) -> Self {
        Self::Unsubscribe {
            params: vec![stream.stream_name()],
            id: Uuid::new_v4(),
        }
    }

    /// Stream names this message subscribes or unsubscribes.
    pub fn params(&self) -> &[String] {
        match self {
            Self::Subscribe { params, .. } | Self::Unsubscribe { params, .. } => params,
        }
    }
}

// ─── Inbound messages ────────────────────────────────────────────────────────

/// Raw inbound message from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageIn {
    /// A combined-stream envelope carrying one incremental kline.
    Stream(StreamEnvelope),
    /// Ack for a subscribe/unsubscribe request. Carries no data.
    Ack(AckResponse),
}

/// Combined-stream envelope: `{"stream":"…","data":{"k":{…}}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEnvelope {
    #[serde(default)]
    pub stream: Option<String>,
    pub data: KlineEvent,
}

/// `{"result":null,"id":"…"}` — response to a subscribe/unsubscribe.
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

// ─── WsEvent ─────────────────────────────────────────────────────────────────

/// High-level events emitted by the WS client to the consumer.
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// A parsed message from the server.
    Message(MessageIn),
    /// Connection established.
    Connected,
    /// Connection lost (may trigger reconnect).
    Disconnected { code: Option<u16>, reason: String },
    /// A deserialization or protocol error.
    Error(String),
    /// Reconnection attempts exhausted; the client stays down.
    MaxReconnectReached,
}

// ─── ReadyState ──────────────────────────────────────────────────────────────

/// Connection state, numbered like the browser `WebSocket.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl From<u16> for ReadyState {
    fn from(v: u16) -> Self {
        match v {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

// ─── WsConfig ────────────────────────────────────────────────────────────────

/// Configuration for the WS client.
#[derive(Debug, Clone)]
pub struct WsConfig {
    pub url: String,
    pub reconnect: bool,
    pub base_reconnect_delay_ms: u32,
    pub max_reconnect_attempts: u32,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_WS_URL.to_string(),
            reconnect: true,
            base_reconnect_delay_ms: 2000,
            max_reconnect_attempts: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{Resolution, Symbol};

    fn btc_1m() -> KlineStream {
        KlineStream::new(Symbol::new("BTCUSDT"), Resolution::Min1)
    }

    #[test]
    fn test_subscribe_wire_shape() {
        let msg = MessageOut::subscribe(&btc_1m());
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["method"], "SUBSCRIBE");
        assert_eq!(parsed["params"][0], "btcusdt@kline_1m@+08:00");
        assert!(parsed["id"].is_string());
    }

    #[test]
    fn test_unsubscribe_wire_shape() {
        let msg = MessageOut::unsubscribe(&btc_1m());
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["method"], "UNSUBSCRIBE");
        assert_eq!(parsed["params"][0], "btcusdt@kline_1m@+08:00");
    }

    #[test]
    fn test_inbound_kline_envelope() {
        let raw = r#"{
            "stream": "btcusdt@kline_1m",
            "data": {
                "e": "kline",
                "k": {
                    "t": 1700000000000,
                    "o": "42000.01",
                    "c": "42010.55",
                    "h": "42020.00",
                    "l": "41990.00",
                    "v": "12.5"
                }
            }
        }"#;
        let msg: MessageIn = serde_json::from_str(raw).unwrap();
        match msg {
            MessageIn::Stream(env) => {
                assert_eq!(env.stream.as_deref(), Some("btcusdt@kline_1m"));
                assert_eq!(env.data.kline.open_time, 1700000000000);
            }
            other => panic!("expected stream envelope, got {other:?}"),
        }
    }

    #[test]
    fn test_inbound_ack_has_no_data() {
        let raw = r#"{"result":null,"id":"3f2a"}"#;
        let msg: MessageIn = serde_json::from_str(raw).unwrap();
        assert!(matches!(msg, MessageIn::Ack(_)));
    }
}
