use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ratatui::text::Line;

use crate::api::{ServerReply, TranscriptEntry};
use crate::core::controller::{ChatController, ControllerOptions};
use crate::core::transport::{ChatTransport, TransportError};
use crate::utils::clipboard::{Clipboard, ClipboardError};
use crate::utils::syntax::{HighlightError, Highlighter};

pub fn create_test_controller() -> ChatController {
    ChatController::new(ControllerOptions::default())
}

pub fn http_error(status: u16) -> TransportError {
    TransportError::Status {
        status,
        url: "http://test.local/send_message".to_string(),
    }
}

/// Transport that answers from a script and records what it was sent.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<VecDeque<Result<ServerReply, TransportError>>>,
    sent: Mutex<Vec<String>>,
    transcript: Mutex<Vec<TranscriptEntry>>,
    clear_status: Mutex<Option<u16>>,
    clears: Mutex<usize>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: Result<ServerReply, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn set_transcript(&self, entries: Vec<TranscriptEntry>) {
        *self.transcript.lock().unwrap() = entries;
    }

    pub fn fail_clear_with(&self, status: u16) {
        *self.clear_status.lock().unwrap() = Some(status);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock().unwrap()
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_message(&self, text: &str) -> Result<ServerReply, TransportError> {
        self.sent.lock().unwrap().push(text.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ServerReply::empty()))
    }

    async fn clear(&self) -> Result<(), TransportError> {
        *self.clears.lock().unwrap() += 1;
        match *self.clear_status.lock().unwrap() {
            Some(status) => Err(http_error(status)),
            None => Ok(()),
        }
    }

    async fn load_transcript(&self) -> Result<Vec<TranscriptEntry>, TransportError> {
        Ok(self.transcript.lock().unwrap().clone())
    }
}

/// Clipboard that records writes, or rejects them all.
#[derive(Default)]
pub struct FakeClipboard {
    deny: bool,
    writes: Mutex<Vec<String>>,
}

impl FakeClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Clipboard for FakeClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError::Denied("permission denied".into()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct FailingHighlighter;

impl Highlighter for FailingHighlighter {
    fn highlight(&self, _lang: &str, _code: &str) -> Result<Vec<Line<'static>>, HighlightError> {
        Err(HighlightError::Scan("boom".into()))
    }
}

/// Highlighter that returns each source line unstyled.
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, _lang: &str, code: &str) -> Result<Vec<Line<'static>>, HighlightError> {
        Ok(code.lines().map(|l| Line::from(l.to_string())).collect())
    }
}

pub const SAMPLE_PAGE: &str = r#"<!doctype html>
<html><body>
  <div id="chat-box">
    <div class="user-message">hello</div>
    <div class="bot-message"><p>A</p></div>
    <div class="bot-message"><p>B</p></div>
  </div>
</body></html>"#;
