//! Event polling, dispatching and redraws for the interactive session.
//!
//! The loop task owns the [`ChatController`]. Network calls and clipboard
//! writes run in spawned tasks and report back as [`UiEvent`]s, so the
//! controller is only ever touched here.

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind, MouseEventKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tui_textarea::Input as TAInput;

use crate::api::{ServerReply, TranscriptEntry};
use crate::core::controller::{ChatController, Submission};
use crate::core::document::CopyTarget;
use crate::core::transport::{ChatTransport, TransportError};
use crate::ui::renderer::{ui, ChatView, FrameMetrics};
use crate::utils::clipboard::{Clipboard, ClipboardError};

use super::keybindings::{resolve_key, KeyAction, KeyContext};
use super::lifecycle::{restore_terminal, setup_terminal};
use super::setup::ChatSession;

const TICK: Duration = Duration::from_millis(50);
const MOUSE_SCROLL_STEP: u16 = 3;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
    Submitted {
        submission: Submission,
        result: Result<ServerReply, TransportError>,
    },
    Cleared(Result<(), TransportError>),
    HistoryLoaded(Result<Vec<TranscriptEntry>, TransportError>),
    CopyFinished {
        target: CopyTarget,
        result: Result<(), ClipboardError>,
    },
}

/// Handles for the work the loop hands off.
#[derive(Clone)]
pub struct Spawner {
    transport: Arc<dyn ChatTransport>,
    clipboard: Arc<dyn Clipboard>,
    tx: mpsc::UnboundedSender<UiEvent>,
    cancel: CancellationToken,
}

impl Spawner {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        clipboard: Arc<dyn Clipboard>,
        tx: mpsc::UnboundedSender<UiEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            clipboard,
            tx,
            cancel,
        }
    }

    fn submit(&self, submission: Submission) {
        let transport = self.transport.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        let text = submission.text.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(submission = submission.id, "submission cancelled on exit");
                }
                result = transport.send_message(&text) => {
                    let _ = tx.send(UiEvent::Submitted { submission, result });
                }
            }
        });
    }

    fn clear(&self) {
        let transport = self.transport.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = transport.clear() => {
                    let _ = tx.send(UiEvent::Cleared(result));
                }
            }
        });
    }

    fn load_history(&self) {
        let transport = self.transport.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = transport.load_transcript() => {
                    let _ = tx.send(UiEvent::HistoryLoaded(result));
                }
            }
        });
    }

    fn copy(&self, target: CopyTarget, text: String) {
        let clipboard = self.clipboard.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || clipboard.write_text(&text))
                .await
                .unwrap_or_else(|err| Err(ClipboardError::CommandFailed(err.to_string())));
            let _ = tx.send(UiEvent::CopyFinished { target, result });
        });
    }
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub request_redraw: bool,
    pub exit_requested: bool,
}

impl EventOutcome {
    fn redraw() -> Self {
        Self {
            request_redraw: true,
            exit_requested: false,
        }
    }
}

fn apply_key_action(
    controller: &mut ChatController,
    spawner: &Spawner,
    action: KeyAction,
    metrics: FrameMetrics,
) -> EventOutcome {
    match action {
        KeyAction::Quit => {
            return EventOutcome {
                request_redraw: false,
                exit_requested: true,
            }
        }
        KeyAction::Submit => {
            let raw = controller.form().value();
            if let Some(submission) = controller.begin_submit(&raw) {
                spawner.submit(submission);
            }
        }
        KeyAction::InsertNewline => {
            controller.edit_input(|ta| ta.insert_newline());
        }
        KeyAction::Edit(key) => {
            controller.clear_copy_selection();
            controller.edit_input(|ta| {
                ta.input(TAInput::from(key));
            });
        }
        KeyAction::NextCopyTarget => controller.cycle_copy_selection(true),
        KeyAction::PreviousCopyTarget => controller.cycle_copy_selection(false),
        KeyAction::ClearSelection => controller.clear_copy_selection(),
        KeyAction::Copy => {
            if let Some(request) = controller.activate_copy(None) {
                spawner.copy(request.target, request.text);
            }
        }
        KeyAction::ClearConversation => {
            if controller.begin_clear() {
                spawner.clear();
            }
        }
        KeyAction::ScrollUp(lines) => controller.scroll_up(lines),
        KeyAction::ScrollDown(lines) => controller.scroll_down(lines),
        KeyAction::PageUp => controller.scroll_up(metrics.transcript_height.max(1)),
        KeyAction::PageDown => controller.scroll_down(metrics.transcript_height.max(1)),
        KeyAction::ScrollToLatest => controller.scroll_to_latest(),
        KeyAction::Ignore => return EventOutcome::default(),
    }
    EventOutcome::redraw()
}

/// Apply one event to the controller. Pure with respect to the terminal.
pub fn handle_event(
    controller: &mut ChatController,
    spawner: &Spawner,
    event: UiEvent,
    metrics: FrameMetrics,
) -> EventOutcome {
    match event {
        UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            let context = KeyContext {
                copy_selected: controller.selected_copy().is_some(),
            };
            apply_key_action(controller, spawner, resolve_key(key, context), metrics)
        }
        UiEvent::Crossterm(Event::Paste(text)) => {
            let text = sanitize_pasted_text(&text);
            controller.edit_input(|ta| {
                ta.insert_str(&text);
            });
            EventOutcome::redraw()
        }
        UiEvent::Crossterm(Event::Mouse(mouse)) => match mouse.kind {
            MouseEventKind::ScrollUp => {
                controller.scroll_up(MOUSE_SCROLL_STEP);
                EventOutcome::redraw()
            }
            MouseEventKind::ScrollDown => {
                controller.scroll_down(MOUSE_SCROLL_STEP);
                EventOutcome::redraw()
            }
            _ => EventOutcome::default(),
        },
        UiEvent::Crossterm(Event::Resize(_, _)) => EventOutcome::redraw(),
        UiEvent::Crossterm(_) => EventOutcome::default(),
        UiEvent::Submitted { submission, result } => {
            controller.finish_submit(&submission, result);
            EventOutcome::redraw()
        }
        UiEvent::Cleared(result) => {
            controller.finish_clear(result);
            EventOutcome::redraw()
        }
        UiEvent::HistoryLoaded(result) => {
            controller.apply_history(result);
            EventOutcome::redraw()
        }
        UiEvent::CopyFinished { target, result } => {
            controller.copy_finished(target, result, Instant::now());
            EventOutcome::redraw()
        }
    }
}

fn spawn_event_reader(
    event_tx: mpsc::UnboundedSender<UiEvent>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while !cancel.is_cancelled() {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub async fn run_chat(
    session: ChatSession,
    clipboard: Arc<dyn Clipboard>,
) -> Result<(), Box<dyn Error>> {
    let ChatSession {
        mut controller,
        transport,
        theme,
        title,
        load_history,
    } = session;

    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<UiEvent>();
    let spawner = Spawner::new(transport, clipboard, tx.clone(), cancel.clone());
    if load_history && controller.begin_history_load() {
        spawner.load_history();
    }

    let mut terminal = setup_terminal()?;
    let event_reader_handle = spawn_event_reader(tx, cancel.clone());
    let view = ChatView {
        theme: &theme,
        title: &title,
    };

    let mut metrics = FrameMetrics::default();
    let mut request_redraw = true;
    let mut ticker = tokio::time::interval(TICK);

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if request_redraw {
            if let Err(err) = terminal.draw(|f| metrics = ui(f, &controller, &view)) {
                break 'main_loop Err(err.into());
            }
            controller.clamp_scroll(metrics.max_scroll_back);
            request_redraw = false;
        }

        tokio::select! {
            Some(event) = rx.recv() => {
                let outcome = handle_event(&mut controller, &spawner, event, metrics);
                if outcome.exit_requested {
                    break 'main_loop Ok(());
                }
                request_redraw |= outcome.request_redraw;
                while let Ok(event) = rx.try_recv() {
                    let outcome = handle_event(&mut controller, &spawner, event, metrics);
                    if outcome.exit_requested {
                        break 'main_loop Ok(());
                    }
                    request_redraw |= outcome.request_redraw;
                }
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                if controller.tick(now) || controller.document().typing().is_some() {
                    request_redraw = true;
                }
            }
        }
    };

    cancel.cancel();
    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::copy::CopyFeedback;
    use crate::utils::test_utils::{create_test_controller, FakeClipboard, FakeTransport};
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn spawner() -> (Spawner, mpsc::UnboundedReceiver<UiEvent>, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let spawner = Spawner::new(
            transport.clone(),
            Arc::new(FakeClipboard::new()),
            tx,
            CancellationToken::new(),
        );
        (spawner, rx, transport)
    }

    fn press(code: KeyCode) -> UiEvent {
        UiEvent::Crossterm(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn sanitize_paste_text_removes_control_characters() {
        assert_eq!(sanitize_pasted_text("a\r\nb\tc\u{7}"), "a\nb    c");
    }

    #[tokio::test]
    async fn typing_and_enter_round_trip_through_the_channel() {
        let (spawner, mut rx, transport) = spawner();
        transport.push_reply(Ok(ServerReply::with_reply("<p>pong</p>")));
        let mut controller = create_test_controller();
        let metrics = FrameMetrics::default();

        for ch in "ping".chars() {
            handle_event(&mut controller, &spawner, press(KeyCode::Char(ch)), metrics);
        }
        assert!(controller.form().submit_enabled());
        handle_event(&mut controller, &spawner, press(KeyCode::Enter), metrics);
        assert!(controller.is_waiting());
        assert_eq!(controller.document().len(), 1);

        let event = rx.recv().await.expect("submission result");
        handle_event(&mut controller, &spawner, event, metrics);
        assert!(!controller.is_waiting());
        assert_eq!(controller.document().len(), 2);
        assert_eq!(transport.sent(), vec!["ping".to_string()]);
    }

    #[tokio::test]
    async fn enter_is_ignored_until_history_arrives() {
        let (spawner, mut rx, transport) = spawner();
        let mut controller = create_test_controller();
        let metrics = FrameMetrics::default();
        assert!(controller.begin_history_load());
        spawner.load_history();

        handle_event(&mut controller, &spawner, press(KeyCode::Char('x')), metrics);
        handle_event(&mut controller, &spawner, press(KeyCode::Enter), metrics);
        assert!(transport.sent().is_empty());

        let event = rx.recv().await.expect("history result");
        handle_event(&mut controller, &spawner, event, metrics);
        assert!(!controller.is_loading_history());
        assert!(controller.form().input_enabled());
    }

    #[tokio::test]
    async fn enter_on_blank_input_does_nothing() {
        let (spawner, _rx, transport) = spawner();
        let mut controller = create_test_controller();
        handle_event(
            &mut controller,
            &spawner,
            press(KeyCode::Char(' ')),
            FrameMetrics::default(),
        );
        handle_event(
            &mut controller,
            &spawner,
            press(KeyCode::Enter),
            FrameMetrics::default(),
        );
        assert!(!controller.is_waiting());
        assert!(transport.sent().is_empty());
        assert_eq!(controller.document().len(), 0);
    }

    #[tokio::test]
    async fn copy_runs_off_thread_and_reports_back() {
        let (spawner, mut rx, _transport) = spawner();
        let mut controller = create_test_controller();
        controller.render_user_message("copy me");
        let metrics = FrameMetrics::default();

        handle_event(&mut controller, &spawner, press(KeyCode::Tab), metrics);
        let target = controller.selected_copy().expect("selection");
        handle_event(&mut controller, &spawner, press(KeyCode::Enter), metrics);
        assert_eq!(
            controller.document().copy_control(target).map(|c| c.feedback()),
            Some(CopyFeedback::Pending)
        );

        let event = rx.recv().await.expect("copy result");
        handle_event(&mut controller, &spawner, event, metrics);
        assert!(matches!(
            controller.document().copy_control(target).map(|c| c.feedback()),
            Some(CopyFeedback::Copied { .. })
        ));
    }

    #[tokio::test]
    async fn ctrl_c_requests_exit() {
        let (spawner, _rx, _transport) = spawner();
        let mut controller = create_test_controller();
        let outcome = handle_event(
            &mut controller,
            &spawner,
            UiEvent::Crossterm(Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            ))),
            FrameMetrics::default(),
        );
        assert!(outcome.exit_requested);
    }
}
