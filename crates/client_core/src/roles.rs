//! Stable per-identity color roles.
//!
//! An identity is a display name plus its network origin, so a participant
//! who reconnects under a new session id keeps their color. Assignments are
//! never released: the palette is bounded and identities are not, so colors
//! start repeating once every entry is taken.

use std::collections::HashMap;

use shared::protocol::SYSTEM_SENDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleStyle {
    pub color: &'static str,
    pub class: &'static str,
}

impl RoleStyle {
    pub const fn new(color: &'static str, class: &'static str) -> Self {
        Self { color, class }
    }

    pub fn is_system(&self) -> bool {
        *self == SYSTEM_ROLE
    }
}

pub const SYSTEM_ROLE: RoleStyle = RoleStyle::new("", "system");

pub const DEFAULT_PALETTE: [RoleStyle; 6] = [
    RoleStyle::new("#5865f2", "role-purple"),
    RoleStyle::new("#ed4245", "role-red"),
    RoleStyle::new("#57f287", "role-green"),
    RoleStyle::new("#faa61a", "role-yellow"),
    RoleStyle::new("#eb459e", "role-pink"),
    RoleStyle::new("#00b0f4", "role-cyan"),
];

#[derive(Debug, Clone)]
pub struct RoleAssigner {
    palette: &'static [RoleStyle],
    assigned: HashMap<String, RoleStyle>,
}

impl Default for RoleAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleAssigner {
    pub fn new() -> Self {
        Self::with_palette(&DEFAULT_PALETTE)
    }

    /// `palette` must not be empty.
    pub fn with_palette(palette: &'static [RoleStyle]) -> Self {
        debug_assert!(!palette.is_empty(), "role palette must not be empty");
        Self {
            palette,
            assigned: HashMap::new(),
        }
    }

    pub fn assign(&mut self, display_name: &str, origin: &str) -> RoleStyle {
        if display_name == SYSTEM_SENDER {
            return SYSTEM_ROLE;
        }

        let key = format!("{display_name}{origin}");
        if let Some(role) = self.assigned.get(&key) {
            return *role;
        }

        let role = self.next_role();
        tracing::debug!(identity = %key, class = role.class, "assigned role");
        self.assigned.insert(key, role);
        role
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    fn next_role(&self) -> RoleStyle {
        let free = self.palette.iter().find(|candidate| {
            !self
                .assigned
                .values()
                .any(|used| used.class == candidate.class)
        });
        match free {
            Some(role) => *role,
            None if self.palette.is_empty() => SYSTEM_ROLE,
            None => self.palette[self.assigned.len() % self.palette.len()],
        }
    }
}

#[cfg(test)]
#[path = "tests/roles_tests.rs"]
mod tests;
