//! Local view of who is present, reconciled against server presence events.

use shared::domain::{Participant, SessionId};

/// Human-readable notice produced by a presence change, destined for the
/// system log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceNotice {
    pub text: String,
}

impl PresenceNotice {
    fn joined(user: &Participant) -> Self {
        Self {
            text: format!(
                "{} ({}) joined",
                user.display_name_or_placeholder(),
                user.origin_or_placeholder()
            ),
        }
    }

    fn left(user: &Participant) -> Self {
        Self {
            text: format!(
                "{} ({}) left",
                user.display_name_or_placeholder(),
                user.origin_or_placeholder()
            ),
        }
    }
}

/// Insertion-ordered membership set keyed on session id.
#[derive(Debug, Clone, Default)]
pub struct MembershipStore {
    members: Vec<Participant>,
}

impl MembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every member with the server's snapshot.
    pub fn apply_snapshot(&mut self, users: Vec<Participant>) {
        tracing::debug!(
            previous = self.members.len(),
            current = users.len(),
            "applying presence snapshot"
        );
        self.members = users;
    }

    /// Appends `user` unless its session is already present. The notice is
    /// produced either way.
    pub fn apply_join(&mut self, user: Participant) -> PresenceNotice {
        let notice = PresenceNotice::joined(&user);
        if self.contains(&user.session_id) {
            tracing::debug!(sid = %user.session_id, "ignoring duplicate presence join");
        } else {
            self.members.push(user);
        }
        notice
    }

    /// Removes every entry for the leaving session. The notice is produced
    /// even when the session was not present.
    pub fn apply_leave(&mut self, user: &Participant) -> PresenceNotice {
        let before = self.members.len();
        self.members
            .retain(|member| member.session_id != user.session_id);
        if before == self.members.len() {
            tracing::debug!(sid = %user.session_id, "presence leave for unknown session");
        }
        PresenceNotice::left(user)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.members
            .iter()
            .any(|member| &member.session_id == session_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }
}

#[cfg(test)]
#[path = "tests/presence_tests.rs"]
mod tests;
