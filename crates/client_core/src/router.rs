//! Dispatches named session events to the membership store and the message
//! classifier, tracks connectivity, and gates outbound requests.

use shared::{
    domain::Participant,
    protocol::{ChatMessage, ClientRequest, PresenceSnapshot, ServerEvent},
};
use tracing::{debug, info};

use crate::{
    classify::{classify, ChatLine, RenderDescriptor},
    compose::{validate_message, validate_name},
    error::ComposeError,
    presence::MembershipStore,
    roles::RoleAssigner,
    system_log::{LogLine, SystemLog},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Disconnected,
    Connected,
}

impl Connectivity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Full redraw of the member panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPanel {
    pub count: usize,
    pub members: Vec<Participant>,
}

/// What the presentation layer has to draw after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    Status(Connectivity),
    Members(MemberPanel),
    SystemLog(LogLine),
    Chat(ChatLine),
}

#[derive(Debug, Default)]
pub struct SessionRouter {
    connectivity: Connectivity,
    membership: MembershipStore,
    roles: RoleAssigner,
    system_log: SystemLog,
    chat: Vec<ChatLine>,
    local_name: Option<String>,
}

impl SessionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one inbound event. Events must be fed in delivery order; the
    /// returned updates reflect the state after this event only.
    pub fn handle(&mut self, event: ServerEvent) -> Vec<ViewUpdate> {
        match event {
            ServerEvent::Connected => self.set_connectivity(Connectivity::Connected),
            ServerEvent::Disconnected => self.set_connectivity(Connectivity::Disconnected),
            ServerEvent::Message(message) => self.on_message(&message),
            ServerEvent::PresenceSnapshot(snapshot) => self.on_snapshot(snapshot),
            ServerEvent::PresenceJoin(user) => {
                let notice = self.membership.apply_join(user);
                vec![
                    self.member_panel(),
                    ViewUpdate::SystemLog(self.system_log.append(notice.text)),
                ]
            }
            ServerEvent::PresenceLeave(user) => {
                let notice = self.membership.apply_leave(&user);
                vec![
                    self.member_panel(),
                    ViewUpdate::SystemLog(self.system_log.append(notice.text)),
                ]
            }
        }
    }

    /// Validates a display name. Nothing is recorded until the request has
    /// actually been handed to the transport, see [`Self::record_name`].
    pub fn submit_name(&self, raw: &str) -> Result<String, ComposeError> {
        validate_name(raw)
    }

    /// Records `name` as the local identity once its `set_name` went out.
    pub fn record_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        info!(name = %name, "display name set");
        self.local_name = Some(name);
    }

    /// Validates a chat message; a display name must have been set first.
    pub fn submit_message(&self, raw: &str) -> Result<ClientRequest, ComposeError> {
        if self.local_name.is_none() {
            return Err(ComposeError::NameNotSet);
        }
        Ok(ClientRequest::Message(validate_message(raw)?))
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn membership(&self) -> &MembershipStore {
        &self.membership
    }

    pub fn system_log(&self) -> &SystemLog {
        &self.system_log
    }

    pub fn chat(&self) -> &[ChatLine] {
        &self.chat
    }

    fn set_connectivity(&mut self, next: Connectivity) -> Vec<ViewUpdate> {
        if self.connectivity == next {
            return Vec::new();
        }
        info!(status = next.label(), "connectivity changed");
        self.connectivity = next;
        vec![ViewUpdate::Status(next)]
    }

    fn on_message(&mut self, message: &ChatMessage) -> Vec<ViewUpdate> {
        match classify(message, self.local_name.as_deref(), &mut self.roles) {
            RenderDescriptor::SystemLog(text) => {
                vec![ViewUpdate::SystemLog(self.system_log.append(text))]
            }
            RenderDescriptor::Chat(line) => {
                self.chat.push(line.clone());
                vec![ViewUpdate::Chat(line)]
            }
        }
    }

    fn on_snapshot(&mut self, snapshot: PresenceSnapshot) -> Vec<ViewUpdate> {
        // Seed lines are only wanted on a fresh log; a reconnect must not
        // repeat them.
        let seed_log = self.system_log.is_empty();
        self.membership.apply_snapshot(snapshot.users);
        let mut updates = vec![self.member_panel()];
        if let Some(lines) = snapshot.system.filter(|_| seed_log) {
            debug!(lines = lines.len(), "seeding system log from snapshot");
            updates.extend(
                lines
                    .into_iter()
                    .map(|text| ViewUpdate::SystemLog(self.system_log.append(text))),
            );
        }
        updates
    }

    fn member_panel(&self) -> ViewUpdate {
        ViewUpdate::Members(MemberPanel {
            count: self.membership.len(),
            members: self.membership.members().to_vec(),
        })
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
