use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;

use crate::compose::DEFAULT_SEND_COOLDOWN;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub display_name: Option<String>,
    pub send_cooldown_ms: u64,
    pub reconnect_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            display_name: None,
            send_cooldown_ms: DEFAULT_SEND_COOLDOWN.as_millis() as u64,
            reconnect_delay_ms: 2_000,
        }
    }
}

impl ClientSettings {
    pub fn send_cooldown(&self) -> Duration {
        Duration::from_millis(self.send_cooldown_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Defaults, then the flat key/value file at `path` (if readable), then
/// environment variables.
pub fn load_settings(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub(crate) fn apply_file(settings: &mut ClientSettings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable client config");
            return;
        }
    };

    if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
        settings.server_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("name").and_then(toml::Value::as_str) {
        settings.display_name = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("send_cooldown_ms").and_then(as_millis) {
        settings.send_cooldown_ms = v;
    }
    if let Some(v) = file_cfg.get("reconnect_delay_ms").and_then(as_millis) {
        settings.reconnect_delay_ms = v;
    }
}

fn as_millis(value: &toml::Value) -> Option<u64> {
    value.as_integer().and_then(|v| u64::try_from(v).ok())
}

pub(crate) fn apply_env(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("LANCHAT_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("LANCHAT_NAME") {
        settings.display_name = Some(v);
    }
    if let Some(v) = var("APP__NAME") {
        settings.display_name = Some(v);
    }

    if let Some(v) = var("APP__SEND_COOLDOWN_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.send_cooldown_ms = parsed;
        }
    }
    if let Some(v) = var("APP__RECONNECT_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.reconnect_delay_ms = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
