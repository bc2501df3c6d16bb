use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{domain::Participant, error::PayloadError};

pub const EVENT_CONNECT: &str = "connect";
pub const EVENT_DISCONNECT: &str = "disconnect";
pub const EVENT_MESSAGE: &str = "message";
pub const EVENT_PRESENCE_SNAPSHOT: &str = "presence_snapshot";
pub const EVENT_PRESENCE_JOIN: &str = "presence_join";
pub const EVENT_PRESENCE_LEAVE: &str = "presence_leave";
pub const EVENT_SET_NAME: &str = "set_name";

/// Sender label the server uses for its own notices.
pub const SYSTEM_SENDER: &str = "System";

/// Longest display name the client will submit, in characters.
pub const MAX_NAME_CHARS: usize = 32;

/// `message` payload: `name` is the sender label, usually `"<name> (<ip>)"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "name", default)]
    pub sender_label: String,
    #[serde(rename = "msg", default)]
    pub body: String,
}

impl ChatMessage {
    pub fn new(sender_label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender_label: sender_label.into(),
            body: body.into(),
        }
    }
}

/// Full presence set. Entries are decoded one at a time so a single bad
/// entry cannot cost the whole resync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    #[serde(default, deserialize_with = "lenient_users")]
    pub users: Vec<Participant>,
    #[serde(
        default,
        deserialize_with = "lenient_lines",
        skip_serializing_if = "Option::is_none"
    )]
    pub system: Option<Vec<String>>,
}

fn lenient_users<'de, D>(deserializer: D) -> Result<Vec<Participant>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

fn lenient_lines<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(line) => Some(line),
                _ => None,
            })
            .collect(),
    ))
}

/// Named events delivered to the client, including the transport's own
/// connectivity transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Connected,
    Disconnected,
    Message(ChatMessage),
    PresenceSnapshot(PresenceSnapshot),
    PresenceJoin(Participant),
    PresenceLeave(Participant),
}

impl ServerEvent {
    /// Decodes a named event and its JSON payload.
    ///
    /// Returns `Ok(None)` for event names this client does not consume,
    /// including the reserved `connect`/`disconnect` names; connectivity is
    /// reported by the transport itself. A `null` or missing payload decodes
    /// as the payload type's default.
    pub fn from_named(name: &str, payload: Value) -> Result<Option<Self>, PayloadError> {
        let event = match name {
            EVENT_MESSAGE => Self::Message(decode(name, payload)?),
            EVENT_PRESENCE_SNAPSHOT => Self::PresenceSnapshot(decode(name, payload)?),
            EVENT_PRESENCE_JOIN => Self::PresenceJoin(decode(name, payload)?),
            EVENT_PRESENCE_LEAVE => Self::PresenceLeave(decode(name, payload)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected => EVENT_CONNECT,
            Self::Disconnected => EVENT_DISCONNECT,
            Self::Message(_) => EVENT_MESSAGE,
            Self::PresenceSnapshot(_) => EVENT_PRESENCE_SNAPSHOT,
            Self::PresenceJoin(_) => EVENT_PRESENCE_JOIN,
            Self::PresenceLeave(_) => EVENT_PRESENCE_LEAVE,
        }
    }
}

fn decode<T: DeserializeOwned + Default>(name: &str, payload: Value) -> Result<T, PayloadError> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload).map_err(|err| PayloadError::new(name, err))
}

/// Outbound events. Both carry a bare string payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    SetName(String),
    Message(String),
}

impl ClientRequest {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SetName(_) => EVENT_SET_NAME,
            Self::Message(_) => EVENT_MESSAGE,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::SetName(name) => Value::String(name.clone()),
            Self::Message(text) => Value::String(text.clone()),
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
