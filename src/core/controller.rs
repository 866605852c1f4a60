//! The chat interaction controller: sole writer of the UI tree and the form.
//!
//! One user action runs as `begin_submit` (optimistic render, lock the form),
//! a single await on the transport, then `finish_submit` (render the reply or
//! restore the input, unlock the form). The interactive loop spawns the await
//! and feeds the result back; one-shot callers use [`ChatController::submit`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};
use tui_textarea::TextArea;

use crate::api::{ServerReply, TranscriptEntry};
use crate::core::document::{ChatDocument, CopyTarget, NodeId};
use crate::core::enhancer;
use crate::core::form::FormState;
use crate::core::markup::{self, blocks_to_plain_text, strip_control_chars};
use crate::core::message::MessageRole;
use crate::core::transport::{ChatTransport, TransportError};
use crate::utils::clipboard::{Clipboard, ClipboardError};
use crate::utils::logging::TranscriptLog;
use crate::utils::syntax::Highlighter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub typing_indicator: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            typing_indicator: true,
        }
    }
}

/// A message that has been rendered and is waiting on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    /// Trimmed text; this is both the payload and what failure restores.
    pub text: String,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Replied(NodeId),
    /// The server answered without a bot message.
    NoReply,
    Failed(TransportError),
    /// The result belongs to a submission that is no longer in flight.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub target: CopyTarget,
    pub text: String,
}

pub struct ChatController {
    document: ChatDocument,
    form: FormState,
    options: ControllerOptions,
    highlighter: Option<Arc<dyn Highlighter>>,
    transcript: TranscriptLog,
    in_flight: Option<u64>,
    clearing: bool,
    loading_history: bool,
    next_submission: u64,
    notice: Option<String>,
    selected_copy: Option<CopyTarget>,
}

impl ChatController {
    pub fn new(options: ControllerOptions) -> Self {
        let mut controller = Self {
            document: ChatDocument::new(),
            form: FormState::new(),
            options,
            highlighter: None,
            transcript: TranscriptLog::disabled(),
            in_flight: None,
            clearing: false,
            loading_history: false,
            next_submission: 0,
            notice: None,
            selected_copy: None,
        };
        controller.update_submit_enabled();
        controller
    }

    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    pub fn with_transcript(mut self, transcript: TranscriptLog) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn document(&self) -> &ChatDocument {
        &self.document
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_loading_history(&self) -> bool {
        self.loading_history
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    pub fn selected_copy(&self) -> Option<CopyTarget> {
        self.selected_copy
    }

    pub fn transcript_status(&self) -> String {
        self.transcript.get_status_string()
    }

    /// Steps before the network call: validate, render the user message,
    /// show the typing indicator, lock the form.
    ///
    /// Blank input is rejected here for every caller, not only the key
    /// binding, so no request goes out and nothing is appended.
    pub fn begin_submit(&mut self, raw: &str) -> Option<Submission> {
        if self.in_flight.is_some() || self.clearing || self.loading_history {
            debug!("submit ignored: request already in flight");
            return None;
        }
        let text = raw.trim();
        if text.is_empty() {
            debug!("submit ignored: blank input");
            return None;
        }

        let text = text.to_string();
        self.notice = None;
        self.render_user_message(&text);
        if self.options.typing_indicator {
            self.document.show_typing(Instant::now());
        }
        self.form.clear();
        self.form.disable();

        let id = self.next_submission;
        self.next_submission += 1;
        self.in_flight = Some(id);
        Some(Submission { id, text })
    }

    /// Steps after the network call settles, on both paths.
    pub fn finish_submit(
        &mut self,
        submission: &Submission,
        result: Result<ServerReply, TransportError>,
    ) -> SubmitOutcome {
        if self.in_flight != Some(submission.id) {
            debug!(submission = submission.id, "dropping stale submission result");
            return SubmitOutcome::Stale;
        }
        self.in_flight = None;

        let outcome = match result {
            Ok(reply) => {
                self.document.hide_typing();
                match reply.reply {
                    Some(markup) => SubmitOutcome::Replied(self.render_bot_message(&markup)),
                    None => {
                        debug!("response carried no bot message");
                        SubmitOutcome::NoReply
                    }
                }
            }
            Err(err) => {
                self.document.hide_typing();
                error!(error = %err, "message exchange failed");
                self.form.set_value(&submission.text);
                self.notice = Some(format!("Send failed, message restored: {err}"));
                SubmitOutcome::Failed(err)
            }
        };

        self.form.enable_input();
        self.update_submit_enabled();
        // Focus returns to the input.
        self.selected_copy = None;
        outcome
    }

    /// Full exchange for callers that can hold the controller across the
    /// await. Returns `None` when the input was rejected.
    pub async fn submit(
        &mut self,
        transport: &dyn ChatTransport,
        raw: &str,
    ) -> Option<SubmitOutcome> {
        let submission = self.begin_submit(raw)?;
        let result = transport.send_message(&submission.text).await;
        Some(self.finish_submit(&submission, result))
    }

    /// Append trusted reply markup as a bot message and enhance its code
    /// blocks.
    pub fn render_bot_message(&mut self, markup: &str) -> NodeId {
        let blocks = markup::parse_markup(markup);
        let plain = blocks_to_plain_text(&blocks);
        let id = self.document.append_bot(markup.to_string(), blocks);
        if let Some(node) = self.document.node_mut(id) {
            enhancer::enhance(node);
            if let Some(highlighter) = self.highlighter.as_deref() {
                enhancer::apply_highlighting(node, highlighter);
            }
        }
        self.after_append(MessageRole::Bot, &plain);
        id
    }

    /// Append user text literally, with a copy control next to it.
    pub fn render_user_message(&mut self, text: &str) -> NodeId {
        let text = strip_control_chars(text);
        let id = self.document.append_user(text.clone());
        if let Some(node) = self.document.node_mut(id) {
            enhancer::attach_message_copy(node);
        }
        self.after_append(MessageRole::User, &text);
        id
    }

    fn after_append(&mut self, role: MessageRole, plain: &str) {
        self.document.scroll_to_latest();
        self.document.refresh_clear_enabled();
        if let Err(err) = self.transcript.log_message(role, plain) {
            warn!(error = %err, "failed to write transcript");
        }
    }

    pub fn update_submit_enabled(&mut self) {
        self.form.update_submit_enabled();
    }

    /// Edit the input buffer. Ignored while the form is locked.
    pub fn edit_input<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut TextArea<'static>),
    {
        let edited = self.form.apply_edit(f);
        if edited {
            self.notice = None;
        }
        edited
    }

    pub fn begin_clear(&mut self) -> bool {
        if self.in_flight.is_some()
            || self.clearing
            || self.loading_history
            || !self.document.is_clear_enabled()
        {
            return false;
        }
        self.clearing = true;
        true
    }

    pub fn finish_clear(&mut self, result: Result<(), TransportError>) -> bool {
        self.clearing = false;
        match result {
            Ok(()) => {
                self.document.reset();
                self.selected_copy = None;
                self.notice = None;
                if let Err(err) = self.transcript.log_note("Conversation cleared") {
                    warn!(error = %err, "failed to write transcript");
                }
                true
            }
            Err(err) => {
                error!(error = %err, "clearing conversation failed");
                self.notice = Some(format!("Clear failed: {err}"));
                false
            }
        }
    }

    pub async fn clear_conversation(&mut self, transport: &dyn ChatTransport) -> bool {
        if !self.begin_clear() {
            return false;
        }
        let result = transport.clear().await;
        self.finish_clear(result)
    }

    /// Lock the form until the history fetch settles, so nothing can be
    /// submitted ahead of the replayed conversation.
    pub fn begin_history_load(&mut self) -> bool {
        if self.in_flight.is_some() || self.clearing || self.loading_history {
            return false;
        }
        self.loading_history = true;
        self.form.disable();
        true
    }

    /// Render a conversation fetched from the server, oldest first.
    pub fn apply_history(&mut self, result: Result<Vec<TranscriptEntry>, TransportError>) {
        if self.loading_history {
            self.loading_history = false;
            self.form.enable_input();
            self.update_submit_enabled();
        }
        match result {
            Ok(entries) => {
                for entry in entries {
                    match entry.role {
                        MessageRole::User => {
                            self.render_user_message(&markup::plain_text(&entry.content));
                        }
                        MessageRole::Bot => {
                            self.render_bot_message(&entry.content);
                        }
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "could not load conversation history");
                self.notice = Some(format!("Could not load history: {err}"));
            }
        }
    }

    pub async fn load_history(&mut self, transport: &dyn ChatTransport) {
        if !self.begin_history_load() {
            return;
        }
        let result = transport.load_transcript().await;
        self.apply_history(result);
    }

    /// Move the copy selection. With nothing selected, starts at the newest
    /// control.
    pub fn cycle_copy_selection(&mut self, forward: bool) {
        let targets = self.document.copy_targets();
        if targets.is_empty() {
            self.selected_copy = None;
            return;
        }
        let current = self
            .selected_copy
            .and_then(|selected| targets.iter().position(|t| *t == selected));
        let next = match current {
            None => targets.len() - 1,
            Some(index) if forward => (index + 1) % targets.len(),
            Some(0) => targets.len() - 1,
            Some(index) => index - 1,
        };
        self.selected_copy = Some(targets[next]);
    }

    pub fn clear_copy_selection(&mut self) {
        self.selected_copy = None;
    }

    /// Start a copy. Uses the explicit target, else the selection, else the
    /// newest control. Returns the text to put on the clipboard.
    pub fn activate_copy(&mut self, target: Option<CopyTarget>) -> Option<CopyRequest> {
        let target = target
            .or(self.selected_copy)
            .or_else(|| self.document.copy_targets().last().copied())?;
        let text = self.document.copy_text(target)?;
        let control = self.document.copy_control_mut(target)?;
        if !control.begin() {
            return None;
        }
        Some(CopyRequest { target, text })
    }

    pub fn copy_finished(
        &mut self,
        target: CopyTarget,
        result: Result<(), ClipboardError>,
        now: Instant,
    ) {
        if let Err(err) = &result {
            warn!(error = %err, "clipboard write failed");
        }
        if let Some(control) = self.document.copy_control_mut(target) {
            control.finish(result.is_ok(), now);
        }
    }

    /// Synchronous copy through `clipboard`.
    pub fn copy_with(
        &mut self,
        target: Option<CopyTarget>,
        clipboard: &dyn Clipboard,
        now: Instant,
    ) -> bool {
        let Some(request) = self.activate_copy(target) else {
            return false;
        };
        let result = clipboard.write_text(&request.text);
        let ok = result.is_ok();
        self.copy_finished(request.target, result, now);
        ok
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.document.tick(now)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.document.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.document.scroll_down(lines);
    }

    pub fn scroll_to_latest(&mut self) {
        self.document.scroll_to_latest();
    }

    pub fn clamp_scroll(&mut self, max_back: u16) {
        self.document.clamp_scroll(max_back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::copy::CopyFeedback;
    use crate::core::copy::{COPY_FAILURE_FEEDBACK, COPY_SUCCESS_FEEDBACK};
    use crate::core::document::MessageBody;
    use crate::utils::test_utils::{
        create_test_controller, http_error, FakeClipboard, FakeTransport, PlainHighlighter,
    };
    use std::time::Duration;

    fn type_text(controller: &mut ChatController, text: &str) {
        controller.edit_input(|ta| {
            ta.insert_str(text);
        });
    }

    #[tokio::test]
    async fn successful_exchange_appends_user_and_bot() {
        let transport = FakeTransport::new();
        transport.push_reply(Ok(ServerReply::with_reply("<p>B</p>")));
        let mut controller = create_test_controller();

        let outcome = controller.submit(&transport, "hello").await;
        assert!(matches!(outcome, Some(SubmitOutcome::Replied(_))));

        let messages = controller.document().messages();
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &messages[0].body,
            MessageBody::Text { text, copy: Some(_) } if text == "hello"
        ));
        assert!(matches!(
            &messages[1].body,
            MessageBody::Markup { markup, .. } if markup == "<p>B</p>"
        ));
        assert!(controller.document().typing().is_none());
    }

    #[tokio::test]
    async fn reply_without_bot_message_appends_only_user() {
        let transport = FakeTransport::new();
        transport.push_reply(Ok(ServerReply::empty()));
        let mut controller = create_test_controller();

        let outcome = controller.submit(&transport, "ping").await;
        assert!(matches!(outcome, Some(SubmitOutcome::NoReply)));
        assert_eq!(controller.document().len(), 1);
        assert!(controller.form().input_enabled());
    }

    #[tokio::test]
    async fn last_bot_message_of_page_is_rendered() {
        let transport = FakeTransport::new();
        transport.push_reply(Ok(crate::api::html::extract_reply(
            crate::utils::test_utils::SAMPLE_PAGE,
        )));
        let mut controller = create_test_controller();

        controller.submit(&transport, "hello").await;
        let last = controller
            .document()
            .last_bot_message()
            .expect("bot message");
        assert!(matches!(
            &last.body,
            MessageBody::Markup { markup, .. } if markup == "<p>B</p>"
        ));
        assert_eq!(controller.document().len(), 2);
    }

    #[tokio::test]
    async fn whitespace_input_issues_no_request() {
        let transport = FakeTransport::new();
        let mut controller = create_test_controller();

        assert!(controller.submit(&transport, "  ").await.is_none());
        assert!(transport.sent().is_empty());
        assert_eq!(controller.document().len(), 0);
    }

    #[tokio::test]
    async fn payload_is_the_trimmed_text() {
        let transport = FakeTransport::new();
        let mut controller = create_test_controller();
        controller.submit(&transport, "  spaced out \n").await;
        assert_eq!(transport.sent(), vec!["spaced out".to_string()]);
    }

    #[tokio::test]
    async fn transport_failure_restores_input_and_unlocks_form() {
        let transport = FakeTransport::new();
        transport.push_reply(Err(http_error(500)));
        let mut controller = create_test_controller();
        type_text(&mut controller, "keep me");

        let raw = controller.form().value();
        let outcome = controller.submit(&transport, &raw).await;
        assert!(matches!(outcome, Some(SubmitOutcome::Failed(_))));

        assert_eq!(controller.form().value(), "keep me");
        assert!(controller.form().input_enabled());
        assert!(controller.form().submit_enabled());
        assert!(controller.document().typing().is_none());
        assert!(controller.notice().is_some());
        assert_eq!(controller.document().len(), 1);
    }

    #[test]
    fn form_is_locked_while_in_flight() {
        let mut controller = create_test_controller();
        type_text(&mut controller, "first");

        let submission = controller.begin_submit("first").expect("submission");
        assert!(controller.is_waiting());
        assert!(!controller.form().input_enabled());
        assert!(!controller.form().submit_enabled());
        assert_eq!(controller.form().value(), "");
        assert!(controller.document().typing().is_some());

        assert!(controller.begin_submit("second").is_none());
        assert!(!controller.edit_input(|ta| {
            ta.insert_str("x");
        }));

        controller.finish_submit(&submission, Ok(ServerReply::empty()));
        assert!(controller.form().input_enabled());
        assert!(!controller.form().submit_enabled());
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut controller = create_test_controller();
        let submission = controller.begin_submit("one").expect("submission");
        controller.finish_submit(&submission, Ok(ServerReply::empty()));
        let outcome =
            controller.finish_submit(&submission, Ok(ServerReply::with_reply("<p>late</p>")));
        assert!(matches!(outcome, SubmitOutcome::Stale));
        assert_eq!(controller.document().len(), 1);
    }

    #[test]
    fn typing_indicator_can_be_disabled() {
        let mut controller = ChatController::new(ControllerOptions {
            typing_indicator: false,
        });
        controller.begin_submit("hi").expect("submission");
        assert!(controller.document().typing().is_none());
    }

    #[test]
    fn submit_enabled_tracks_every_edit() {
        let mut controller = create_test_controller();
        assert!(!controller.form().submit_enabled());
        type_text(&mut controller, "  ");
        assert!(!controller.form().submit_enabled());
        type_text(&mut controller, "x");
        assert!(controller.form().submit_enabled());
    }

    #[test]
    fn user_text_is_never_interpreted_as_markup() {
        let mut controller = create_test_controller();
        let id = controller.render_user_message("<b>bold</b>");
        let node = controller.document().node(id).expect("node");
        assert!(matches!(
            &node.body,
            MessageBody::Text { text, .. } if text == "<b>bold</b>"
        ));
    }

    #[test]
    fn bot_code_blocks_are_enhanced_and_highlighted() {
        let mut controller = create_test_controller().with_highlighter(Arc::new(PlainHighlighter));
        let id = controller.render_bot_message(
            "<pre><code class=\"language-js\">let a = 1;\nlet b = 2;</code></pre>",
        );
        let node = controller.document().node(id).expect("node");
        let code = node.code_blocks().next().expect("code block");
        assert_eq!(code.badge.as_deref(), Some("JavaScript"));
        assert!(code.copy.is_some());
        assert_eq!(code.highlighted.as_ref().map(Vec::len), Some(2));
        assert!(controller.document().is_clear_enabled());
    }

    #[test]
    fn denied_clipboard_shows_error_then_reverts() {
        let mut controller = create_test_controller();
        controller.render_bot_message("<pre><code>secret()</code></pre>");
        let clipboard = FakeClipboard::denying();
        let start = Instant::now();

        assert!(!controller.copy_with(None, &clipboard, start));
        let target = controller.document().copy_targets()[0];
        let feedback = controller
            .document()
            .copy_control(target)
            .map(|c| c.feedback());
        assert!(matches!(feedback, Some(CopyFeedback::Failed { .. })));

        assert!(controller.tick(start + COPY_FAILURE_FEEDBACK));
        let feedback = controller
            .document()
            .copy_control(target)
            .map(|c| c.feedback());
        assert_eq!(feedback, Some(CopyFeedback::Idle));
    }

    #[test]
    fn copy_writes_selected_text() {
        let mut controller = create_test_controller();
        controller.render_user_message("first");
        controller.render_bot_message("<pre><code>code()</code></pre>");
        let clipboard = FakeClipboard::new();
        let start = Instant::now();

        controller.cycle_copy_selection(false);
        controller.cycle_copy_selection(false);
        assert!(controller.copy_with(None, &clipboard, start));
        assert_eq!(clipboard.writes(), vec!["first".to_string()]);
        assert!(!controller.tick(start + Duration::from_millis(100)));
        assert!(controller.tick(start + COPY_SUCCESS_FEEDBACK));
    }

    #[tokio::test]
    async fn clear_resets_document_and_disables_control() {
        let transport = FakeTransport::new();
        let mut controller = create_test_controller();
        assert!(!controller.clear_conversation(&transport).await);
        assert_eq!(transport.clears(), 0);

        controller.submit(&transport, "hello").await;
        assert!(controller.clear_conversation(&transport).await);
        assert_eq!(controller.document().len(), 0);
        assert!(!controller.document().is_clear_enabled());
    }

    #[tokio::test]
    async fn failed_clear_keeps_messages() {
        let transport = FakeTransport::new();
        transport.fail_clear_with(503);
        let mut controller = create_test_controller();
        controller.render_user_message("keep");

        assert!(!controller.clear_conversation(&transport).await);
        assert_eq!(controller.document().len(), 1);
        assert!(controller.notice().is_some());
        assert!(!controller.is_clearing());
    }

    #[tokio::test]
    async fn history_replays_in_order() {
        let transport = FakeTransport::new();
        transport.set_transcript(vec![
            TranscriptEntry {
                role: MessageRole::User,
                content: "line one<br>line two".into(),
            },
            TranscriptEntry {
                role: MessageRole::Bot,
                content: "<p>answer</p>".into(),
            },
        ]);
        let mut controller = create_test_controller();
        controller.load_history(&transport).await;

        let messages = controller.document().messages();
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &messages[0].body,
            MessageBody::Text { text, .. } if text == "line one\nline two"
        ));
        assert!(messages[1].role.is_bot());
    }

    #[test]
    fn submit_waits_for_history_to_settle() {
        let mut controller = create_test_controller();
        assert!(controller.begin_history_load());
        assert!(!controller.form().input_enabled());
        assert!(controller.begin_submit("new question").is_none());

        controller.apply_history(Ok(vec![TranscriptEntry {
            role: MessageRole::User,
            content: "old".into(),
        }]));
        assert!(!controller.is_loading_history());
        assert!(controller.form().input_enabled());

        let submission = controller.begin_submit("new question").expect("accepted");
        controller.finish_submit(
            &submission,
            Ok(ServerReply::with_reply("<p>answer</p>")),
        );

        let order: Vec<_> = controller
            .document()
            .messages()
            .iter()
            .map(|node| match &node.body {
                MessageBody::Text { text, .. } => text.clone(),
                MessageBody::Markup { markup, .. } => markup.clone(),
            })
            .collect();
        assert_eq!(order, vec!["old", "new question", "<p>answer</p>"]);
    }

    #[test]
    fn failed_history_load_unlocks_the_form() {
        let mut controller = create_test_controller();
        controller.begin_history_load();
        controller.apply_history(Err(http_error(500)));
        assert!(controller.form().input_enabled());
        assert!(controller.notice().is_some());
        assert!(controller.begin_submit("hi").is_some());
    }
}
