//! Local gates for outbound input. Rejected input is never sent and never
//! retried.

use std::time::{Duration, Instant};

use shared::protocol::MAX_NAME_CHARS;

use crate::error::ComposeError;

pub const DEFAULT_SEND_COOLDOWN: Duration = Duration::from_millis(500);

pub fn validate_name(raw: &str) -> Result<String, ComposeError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ComposeError::NameEmpty);
    }
    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        return Err(ComposeError::NameTooLong { chars });
    }
    Ok(name.to_string())
}

pub fn validate_message(raw: &str) -> Result<String, ComposeError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ComposeError::MessageEmpty);
    }
    Ok(text.to_string())
}

/// Disables message submission for a short window after each accepted send.
///
/// This only keeps a double press from sending twice; it does not
/// deduplicate anything.
#[derive(Debug, Clone)]
pub struct SubmitGuard {
    window: Duration,
    busy_until: Option<Instant>,
}

impl Default for SubmitGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_COOLDOWN)
    }
}

impl SubmitGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            busy_until: None,
        }
    }

    pub fn is_busy(&self, now: Instant) -> bool {
        self.busy_until.is_some_and(|until| now < until)
    }

    /// Claims the trigger at `now`, returning `false` while it is still
    /// disabled from the previous send.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.is_busy(now) {
            return false;
        }
        self.busy_until = Some(now + self.window);
        true
    }
}

#[cfg(test)]
#[path = "tests/compose_tests.rs"]
mod tests;
