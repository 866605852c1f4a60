use std::error::Error;
use std::sync::Arc;

use tracing::info;

use crate::core::config::data::Config;
use crate::core::controller::{ChatController, ControllerOptions};
use crate::core::transport::{ChatTransport, HttpTransport};
use crate::ui::theme::Theme;
use crate::utils::logging::TranscriptLog;
use crate::utils::syntax::SyntectHighlighter;
use crate::utils::url::validate_server_url;

/// Everything a chat session needs before the terminal is touched.
pub struct ChatSession {
    pub controller: ChatController,
    pub transport: Arc<dyn ChatTransport>,
    pub theme: Theme,
    pub title: String,
    pub load_history: bool,
}

/// Resolve config and CLI overrides into a ready controller and transport.
pub fn bootstrap_session(
    config: &Config,
    server_override: Option<&str>,
    log_file: Option<String>,
) -> Result<ChatSession, Box<dyn Error>> {
    let endpoints = config.endpoints(server_override);
    validate_server_url(&endpoints.base_url)?;

    let transport = HttpTransport::new(endpoints.clone(), config.request_timeout())?;
    let theme = config.resolved_theme();
    let transcript = TranscriptLog::new(log_file)?;

    let mut controller = ChatController::new(ControllerOptions {
        typing_indicator: config.typing_indicator_enabled(),
    })
    .with_transcript(transcript);
    if config.syntax_enabled() {
        controller = controller.with_highlighter(Arc::new(SyntectHighlighter::new(&theme)));
    }

    info!(server = %endpoints.base_url, "chat session ready");
    let title = format!(
        "chatbox v{} - {} • Log: {}",
        env!("CARGO_PKG_VERSION"),
        endpoints.base_url,
        controller.transcript_status()
    );

    Ok(ChatSession {
        controller,
        transport: Arc::new(transport),
        theme,
        title,
        load_history: config.load_history_enabled(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_applies_config() {
        let config = Config {
            server_url: Some("http://chat.local:8080/".into()),
            typing_indicator: Some(false),
            syntax: Some(false),
            load_history: Some(false),
            ..Config::default()
        };
        let session = bootstrap_session(&config, None, None).expect("session");
        assert!(session.title.contains("http://chat.local:8080/"));
        assert!(session.title.contains("Log: disabled"));
        assert!(!session.load_history);
    }

    #[test]
    fn server_override_wins_and_is_validated() {
        let config = Config::default();
        assert!(bootstrap_session(&config, Some("not a url"), None).is_err());
        let session =
            bootstrap_session(&config, Some("https://override.example"), None).expect("session");
        assert!(session.title.contains("https://override.example"));
    }
}
