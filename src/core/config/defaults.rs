use std::time::Duration;

use crate::core::config::data::Config;
use crate::core::transport::Endpoints;
use crate::ui::theme::Theme;
use crate::utils::url::validate_server_url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SEND_PATH: &str = "/send_message";
pub const DEFAULT_CLEAR_PATH: &str = "/clear";

/// Keys accepted by `chatbox set` and `chatbox unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "server-url",
    "send-path",
    "clear-path",
    "typing-indicator",
    "syntax",
    "theme",
    "request-timeout",
    "load-history",
];

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("Invalid value for {key}: {other} (expected on/off)")),
    }
}

impl Config {
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn endpoints(&self, server_override: Option<&str>) -> Endpoints {
        Endpoints {
            base_url: server_override.unwrap_or(self.server_url()).to_string(),
            send_path: self
                .send_path
                .clone()
                .unwrap_or_else(|| DEFAULT_SEND_PATH.to_string()),
            clear_path: self
                .clear_path
                .clone()
                .unwrap_or_else(|| DEFAULT_CLEAR_PATH.to_string()),
        }
    }

    pub fn typing_indicator_enabled(&self) -> bool {
        self.typing_indicator.unwrap_or(true)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn load_history_enabled(&self) -> bool {
        self.load_history.unwrap_or(true)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn resolved_theme(&self) -> Theme {
        self.theme
            .as_deref()
            .and_then(Theme::from_name)
            .unwrap_or_else(Theme::dark_default)
    }

    /// Apply `chatbox set <key> <value>`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key {
            "server-url" => {
                validate_server_url(value)?;
                self.server_url = Some(value.to_string());
            }
            "send-path" => self.send_path = Some(value.to_string()),
            "clear-path" => self.clear_path = Some(value.to_string()),
            "typing-indicator" => self.typing_indicator = Some(parse_bool(key, value)?),
            "syntax" => self.syntax = Some(parse_bool(key, value)?),
            "theme" => {
                if Theme::from_name(value).is_none() {
                    return Err(format!("Unknown theme: {value} (expected dark or light)"));
                }
                self.theme = Some(value.to_ascii_lowercase());
            }
            "request-timeout" => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid value for {key}: {value} (expected seconds)"))?;
                self.request_timeout_secs = Some(secs);
            }
            "load-history" => self.load_history = Some(parse_bool(key, value)?),
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }

    /// Apply `chatbox unset <key>`.
    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "server-url" => self.server_url = None,
            "send-path" => self.send_path = None,
            "clear-path" => self.clear_path = None,
            "typing-indicator" => self.typing_indicator = None,
            "syntax" => self.syntax = None,
            "theme" => self.theme = None,
            "request-timeout" => self.request_timeout_secs = None,
            "load-history" => self.load_history = None,
            _ => return Err(format!("Unknown config key: {key}")),
        }
        Ok(())
    }
}
