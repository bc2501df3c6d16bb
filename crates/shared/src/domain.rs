use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name shown when a presence payload omits the participant's display name.
pub const UNKNOWN_NAME: &str = "Unknown";
/// Origin shown when a presence payload omits the participant's address.
pub const UNKNOWN_ORIGIN: &str = "-";

/// Opaque per-connection identifier assigned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One present connection as pushed by the server (`{sid, name, ip}`).
///
/// Every field may be missing or carry the wrong type. Such fields decode as
/// absent and the accessors substitute placeholders instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "sid", default, deserialize_with = "lenient_session_id")]
    pub session_id: SessionId,
    #[serde(
        rename = "name",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(
        rename = "ip",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin: Option<String>,
}

impl Participant {
    pub fn new(
        session_id: impl Into<String>,
        display_name: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            session_id: SessionId::new(session_id),
            display_name: Some(display_name.into()),
            origin: Some(origin.into()),
        }
    }

    pub fn display_name_or_placeholder(&self) -> &str {
        non_empty(self.display_name.as_deref()).unwrap_or(UNKNOWN_NAME)
    }

    pub fn origin_or_placeholder(&self) -> &str {
        non_empty(self.origin.as_deref()).unwrap_or(UNKNOWN_ORIGIN)
    }
}

/// Decodes any JSON value, keeping it only when it is a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

fn lenient_session_id<'de, D>(deserializer: D) -> Result<SessionId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(SessionId(lenient_string(deserializer)?.unwrap_or_default()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
