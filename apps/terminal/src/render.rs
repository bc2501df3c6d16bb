//! Plain-text rendering of view updates for a terminal.

use client_core::{
    system_log::LogLine, ChatLine, Connectivity, MemberPanel, RoleStyle, ViewUpdate,
};

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub color: bool,
}

impl Renderer {
    pub fn render(&self, update: &ViewUpdate) -> String {
        match update {
            ViewUpdate::Status(status) => self.status(*status),
            ViewUpdate::Members(panel) => self.members(panel),
            ViewUpdate::SystemLog(line) => self.log_line(line),
            ViewUpdate::Chat(line) => self.chat_line(line),
        }
    }

    fn status(&self, status: Connectivity) -> String {
        let marker = match status {
            Connectivity::Connected => "●",
            Connectivity::Disconnected => "○",
        };
        format!("{marker} {}", status.label())
    }

    fn members(&self, panel: &MemberPanel) -> String {
        let names: Vec<String> = panel
            .members
            .iter()
            .map(|member| {
                format!(
                    "{} ({})",
                    sanitize(member.display_name_or_placeholder()),
                    sanitize(member.origin_or_placeholder())
                )
            })
            .collect();
        format!("Members ({}): {}", panel.count, names.join(", "))
    }

    fn log_line(&self, line: &LogLine) -> String {
        let text = format!("· {}", sanitize(&line.to_string()));
        self.paint(DIM, &text)
    }

    fn chat_line(&self, line: &ChatLine) -> String {
        let name = sanitize(&line.display_name);
        let name = match self.role_color(&line.role) {
            Some(color) => format!("{color}{name}{RESET}"),
            None => name,
        };
        let origin = line
            .origin_suffix()
            .map(|suffix| self.paint(DIM, &sanitize(&suffix)))
            .unwrap_or_default();
        let meta = if line.own_message {
            self.paint(BOLD, &format!("{name}{origin}:"))
        } else {
            format!("{name}{origin}:")
        };
        format!("{meta} {}", sanitize(&line.body))
    }

    fn role_color(&self, role: &RoleStyle) -> Option<String> {
        if !self.color || role.is_system() {
            return None;
        }
        hex_to_ansi(role.color)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// `#rrggbb` to a 24-bit foreground escape.
fn hex_to_ansi(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
    Some(format!("\x1b[38;2;{r};{g};{b}m"))
}

/// Drops control characters so remote text cannot drive the terminal.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::roles::{DEFAULT_PALETTE, SYSTEM_ROLE};
    use shared::domain::Participant;

    fn plain() -> Renderer {
        Renderer { color: false }
    }

    fn line(own_message: bool) -> ChatLine {
        ChatLine {
            role: DEFAULT_PALETTE[1],
            display_name: "Bob".into(),
            origin: Some("10.0.0.4".into()),
            body: "hi <b>there</b>".into(),
            own_message,
        }
    }

    #[test]
    fn renders_chat_line_without_color() {
        assert_eq!(
            plain().render(&ViewUpdate::Chat(line(false))),
            "Bob (10.0.0.4): hi <b>there</b>"
        );
    }

    #[test]
    fn colors_name_with_role() {
        let rendered = Renderer { color: true }.render(&ViewUpdate::Chat(line(true)));
        assert!(rendered.contains("\x1b[38;2;237;66;69mBob"));
        assert!(rendered.starts_with(BOLD));
    }

    #[test]
    fn strips_terminal_escapes_from_remote_text() {
        let mut hostile = line(false);
        hostile.body = "\x1b[2Jgone".into();
        assert_eq!(
            plain().render(&ViewUpdate::Chat(hostile)),
            "Bob (10.0.0.4): [2Jgone"
        );
    }

    #[test]
    fn renders_member_panel_with_placeholders() {
        let panel = MemberPanel {
            count: 2,
            members: vec![
                Participant::new("a", "Alice", "10.0.0.2"),
                Participant::default(),
            ],
        };
        assert_eq!(
            plain().render(&ViewUpdate::Members(panel)),
            "Members (2): Alice (10.0.0.2), Unknown (-)"
        );
    }

    #[test]
    fn renders_status() {
        assert_eq!(
            plain().render(&ViewUpdate::Status(Connectivity::Disconnected)),
            "○ Disconnected"
        );
    }

    #[test]
    fn system_role_is_never_painted() {
        let mut system = line(false);
        system.role = SYSTEM_ROLE;
        let rendered = Renderer { color: true }.render(&ViewUpdate::Chat(system));
        assert!(rendered.starts_with("Bob"));
    }

    #[test]
    fn system_role_has_no_color() {
        assert_eq!(hex_to_ansi(SYSTEM_ROLE.color), None);
        assert_eq!(hex_to_ansi("#00b0f4").as_deref(), Some("\x1b[38;2;0;176;244m"));
        assert_eq!(hex_to_ansi("#zzzzzz"), None);
    }
}
