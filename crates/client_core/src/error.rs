use shared::{error::WireError, protocol::MAX_NAME_CHARS};
use thiserror::Error;

/// Outbound input rejected locally; nothing was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("display name is empty")]
    NameEmpty,
    #[error(
        "display name is {chars} characters; at most {max} are allowed",
        max = MAX_NAME_CHARS
    )]
    NameTooLong { chars: usize },
    #[error("set a display name before sending messages")]
    NameNotSet,
    #[error("message is empty")]
    MessageEmpty,
    #[error("a message was just sent; wait a moment")]
    Busy,
}

impl ComposeError {
    /// Whether the presentation layer should give visible feedback. Empty
    /// input is dropped quietly.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::NameEmpty | Self::MessageEmpty)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to connect websocket {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("websocket failure: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("malformed frame: {0}")]
    Wire(#[from] WireError),
    #[error("server refused namespace connection: {0}")]
    ConnectRefused(String),
    #[error("transport closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
