//! Wire types exchanged with the chat server.

pub mod html;

use serde::{Deserialize, Serialize};

use crate::core::message::MessageRole;

/// Form body of a `POST /send_message` request.
#[derive(Debug, Serialize)]
pub struct SendMessageForm<'a> {
    pub user_message: &'a str,
}

/// Structured reply handed from the transport to the controller.
///
/// Servers that speak JSON send this shape directly. Legacy servers return
/// a full HTML page, which [`html::extract_reply`] reduces to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerReply {
    /// Markup of the newest bot message, if the response carried one.
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default = "default_ok")]
    pub ok: bool,
}

fn default_ok() -> bool {
    true
}

impl ServerReply {
    pub fn with_reply(markup: impl Into<String>) -> Self {
        Self {
            reply: Some(markup.into()),
            ok: true,
        }
    }

    pub fn empty() -> Self {
        Self {
            reply: None,
            ok: true,
        }
    }
}

/// One message of a conversation already held by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: MessageRole,
    /// Inner markup of the message element.
    pub content: String,
}
