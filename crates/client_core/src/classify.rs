//! Routing and render descriptors for inbound chat messages.

use shared::protocol::{ChatMessage, SYSTEM_SENDER};

use crate::roles::{RoleAssigner, RoleStyle};

/// A sender label split into its display name and origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderLabel<'a> {
    pub name: &'a str,
    pub origin: &'a str,
}

/// Splits `"<name> (<origin>)"`.
///
/// The name is the shortest prefix followed by `" ("` and the label must end
/// with `')'`. Labels spanning several lines never match. Anything that does
/// not match is taken whole as the name, with an empty origin.
pub fn parse_sender_label(label: &str) -> SenderLabel<'_> {
    let whole = SenderLabel {
        name: label,
        origin: "",
    };
    if label.contains(['\n', '\r', '\u{2028}', '\u{2029}']) {
        return whole;
    }
    let Some(inner) = label.strip_suffix(')') else {
        return whole;
    };
    match inner.find(" (") {
        Some(idx) => SenderLabel {
            name: &inner[..idx],
            origin: &inner[idx + 2..],
        },
        None => whole,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub role: RoleStyle,
    pub display_name: String,
    pub origin: Option<String>,
    /// Message text exactly as received; not escaped.
    pub body: String,
    pub own_message: bool,
}

impl ChatLine {
    /// The `" (<origin>)"` suffix rendered after the name, if any.
    pub fn origin_suffix(&self) -> Option<String> {
        self.origin.as_ref().map(|origin| format!(" ({origin})"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDescriptor {
    /// Goes to the system log channel only.
    SystemLog(String),
    Chat(ChatLine),
}

/// Classifies `message` for display. `local_name` is the name this client
/// registered, if any.
pub fn classify(
    message: &ChatMessage,
    local_name: Option<&str>,
    roles: &mut RoleAssigner,
) -> RenderDescriptor {
    if message.sender_label == SYSTEM_SENDER {
        return RenderDescriptor::SystemLog(message.body.clone());
    }

    let label = parse_sender_label(&message.sender_label);
    let leading = label.name.split(' ').next().unwrap_or_default();
    let own_message = local_name.is_some_and(|name| name == leading);
    let role = roles.assign(label.name, label.origin);

    RenderDescriptor::Chat(ChatLine {
        role,
        display_name: label.name.to_string(),
        origin: (!label.origin.is_empty()).then(|| label.origin.to_string()),
        body: message.body.clone(),
        own_message,
    })
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod tests;
