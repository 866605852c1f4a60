//! TUI-less "say" command

use std::error::Error;

use crate::core::config::data::Config;
use crate::core::controller::{ChatController, ControllerOptions, SubmitOutcome};
use crate::core::document::MessageBody;
use crate::core::markup::blocks_to_plain_text;
use crate::core::transport::{ChatTransport, HttpTransport};
use crate::utils::logging::TranscriptLog;
use crate::utils::url::validate_server_url;

pub async fn run_say(
    prompt: Vec<String>,
    server: Option<String>,
    log: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: chatbox say <message>");
        std::process::exit(1);
    }

    let config = Config::load()?;
    let endpoints = config.endpoints(server.as_deref());
    validate_server_url(&endpoints.base_url)?;
    let transport = HttpTransport::new(endpoints, config.request_timeout())?;

    let mut controller = ChatController::new(ControllerOptions {
        typing_indicator: false,
    })
    .with_transcript(TranscriptLog::new(log)?);

    match say_once(&mut controller, &transport, &prompt).await {
        Ok(Some(reply)) => {
            println!("{reply}");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            eprintln!("❌ Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Run one exchange and return the reply as plain text.
pub async fn say_once(
    controller: &mut ChatController,
    transport: &dyn ChatTransport,
    prompt: &str,
) -> Result<Option<String>, Box<dyn Error>> {
    match controller.submit(transport, prompt).await {
        Some(SubmitOutcome::Replied(id)) => {
            let text = controller
                .document()
                .node(id)
                .and_then(|node| match &node.body {
                    MessageBody::Markup { blocks, .. } => Some(blocks_to_plain_text(blocks)),
                    MessageBody::Text { .. } => None,
                });
            Ok(text)
        }
        Some(SubmitOutcome::NoReply) | Some(SubmitOutcome::Stale) | None => Ok(None),
        Some(SubmitOutcome::Failed(err)) => Err(err.into()),
    }
}
