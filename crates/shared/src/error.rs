use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("empty packet")]
    Empty,
    #[error("unknown engine packet type '{0}'")]
    UnknownEngineType(char),
    #[error("unknown socket packet type '{0}'")]
    UnknownSocketType(char),
    #[error("invalid open handshake: {0}")]
    InvalidHandshake(#[source] serde_json::Error),
    #[error("invalid socket payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("event packet must be a non-empty array starting with the event name")]
    MalformedEvent,
}

#[derive(Debug, Error)]
#[error("invalid '{event}' payload: {source}")]
pub struct PayloadError {
    pub event: String,
    #[source]
    pub source: serde_json::Error,
}

impl PayloadError {
    pub fn new(event: impl Into<String>, source: serde_json::Error) -> Self {
        Self {
            event: event.into(),
            source,
        }
    }
}
