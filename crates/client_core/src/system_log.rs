//! The system log channel: connectivity and presence notices, kept apart from
//! the chat stream.

use std::fmt;

use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub text: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M"), self.text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemLog {
    lines: Vec<LogLine>,
}

impl SystemLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: impl Into<String>) -> LogLine {
        self.append_at(Local::now(), text)
    }

    pub fn append_at(&mut self, at: DateTime<Local>, text: impl Into<String>) -> LogLine {
        let line = LogLine {
            at,
            text: text.into(),
        };
        self.lines.push(line.clone());
        line
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }
}
