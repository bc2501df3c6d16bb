//! Engine.IO v4 / Socket.IO v5 text framing as used over a websocket.
//!
//! Only text frames are handled; binary attachments are not part of this
//! chat protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WireError;

pub const DEFAULT_NAMESPACE: &str = "/";
pub const ENGINE_IO_VERSION: &str = "4";
pub const SOCKET_IO_PATH: &str = "socket.io/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(text: &str) -> Result<Self, WireError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(WireError::Empty)?;
        let rest = chars.as_str();
        let packet = match kind {
            '0' => Self::Open(serde_json::from_str(rest).map_err(WireError::InvalidHandshake)?),
            '1' => Self::Close,
            '2' => Self::Ping(rest.to_string()),
            '3' => Self::Pong(rest.to_string()),
            '4' => Self::Message(rest.to_string()),
            '5' => Self::Upgrade,
            '6' => Self::Noop,
            other => return Err(WireError::UnknownEngineType(other)),
        };
        Ok(packet)
    }

    pub fn encode(&self) -> String {
        match self {
            // Serializing a plain struct of strings and integers cannot fail.
            Self::Open(handshake) => format!(
                "0{}",
                serde_json::to_string(handshake).unwrap_or_else(|_| "{}".to_string())
            ),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(data) => format!("4{data}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        payload: Value,
    },
    Ack {
        namespace: String,
        ack_id: Option<u64>,
        data: Value,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    pub fn connect() -> Self {
        Self::Connect {
            namespace: DEFAULT_NAMESPACE.to_string(),
            data: None,
        }
    }

    pub fn event(name: impl Into<String>, payload: Value) -> Self {
        Self::Event {
            namespace: DEFAULT_NAMESPACE.to_string(),
            ack_id: None,
            name: name.into(),
            payload,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace,
        }
    }

    /// Decodes the body of an engine `message` packet.
    pub fn decode(text: &str) -> Result<Self, WireError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(WireError::Empty)?;
        let (namespace, rest) = split_namespace(chars.as_str());
        let (ack_id, body) = split_ack_id(rest);
        let data = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(body).map_err(WireError::InvalidPayload)?)
        };

        let packet = match kind {
            '0' => Self::Connect { namespace, data },
            '1' => Self::Disconnect { namespace },
            '2' => {
                let Some(Value::Array(mut items)) = data else {
                    return Err(WireError::MalformedEvent);
                };
                if items.is_empty() {
                    return Err(WireError::MalformedEvent);
                }
                let Value::String(name) = items.remove(0) else {
                    return Err(WireError::MalformedEvent);
                };
                let payload = if items.is_empty() {
                    Value::Null
                } else {
                    items.remove(0)
                };
                Self::Event {
                    namespace,
                    ack_id,
                    name,
                    payload,
                }
            }
            '3' => Self::Ack {
                namespace,
                ack_id,
                data: data.unwrap_or(Value::Null),
            },
            '4' => Self::ConnectError { namespace, data },
            other => return Err(WireError::UnknownSocketType(other)),
        };
        Ok(packet)
    }

    pub fn encode(&self) -> String {
        let (kind, namespace, ack_id, body) = match self {
            Self::Connect { namespace, data } => ('0', namespace, None, data.clone()),
            Self::Disconnect { namespace } => ('1', namespace, None, None),
            Self::Event {
                namespace,
                ack_id,
                name,
                payload,
            } => {
                let mut items = vec![Value::String(name.clone())];
                if !payload.is_null() {
                    items.push(payload.clone());
                }
                ('2', namespace, *ack_id, Some(Value::Array(items)))
            }
            Self::Ack {
                namespace,
                ack_id,
                data,
            } => ('3', namespace, *ack_id, Some(data.clone())),
            Self::ConnectError { namespace, data } => ('4', namespace, None, data.clone()),
        };

        let mut out = String::new();
        out.push(kind);
        if namespace != DEFAULT_NAMESPACE && !namespace.is_empty() {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(body) = body {
            out.push_str(&body.to_string());
        }
        out
    }

    /// Wraps the packet in an engine `message` frame, ready to send.
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }
}

fn split_namespace(text: &str) -> (String, &str) {
    if !text.starts_with('/') {
        return (DEFAULT_NAMESPACE.to_string(), text);
    }
    match text.find(',') {
        Some(idx) => (text[..idx].to_string(), &text[idx + 1..]),
        None => (text.to_string(), ""),
    }
}

fn split_ack_id(text: &str) -> (Option<u64>, &str) {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, text);
    }
    (text[..digits].parse().ok(), &text[digits..])
}

#[cfg(test)]
#[path = "tests/wire_tests.rs"]
mod tests;
