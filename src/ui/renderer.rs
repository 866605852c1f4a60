use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::controller::ChatController;
use crate::ui::render::build_display_lines;
use crate::ui::theme::Theme;

const MAX_INPUT_ROWS: u16 = 6;
const INPUT_HINT: &str = "Message (Enter send, Alt+Enter newline, Tab copy, Ctrl+L clear, Ctrl+C quit)";

/// What the loop needs from the last frame to clamp scrolling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameMetrics {
    pub transcript_height: u16,
    pub max_scroll_back: u16,
}

pub struct ChatView<'a> {
    pub theme: &'a Theme,
    pub title: &'a str,
}

pub fn input_area_height(controller: &ChatController) -> u16 {
    let rows = controller.form().textarea().lines().len().max(1) as u16;
    rows.min(MAX_INPUT_ROWS)
}

pub fn ui(f: &mut Frame, controller: &ChatController, view: &ChatView<'_>) -> FrameMetrics {
    let input_height = input_area_height(controller);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(input_height + 2), // +2 for borders
        ])
        .split(f.area());

    let metrics = render_transcript(f, chunks[0], controller, view);
    render_input(f, chunks[1], controller, view.theme);
    metrics
}

fn render_transcript(
    f: &mut Frame,
    area: Rect,
    controller: &ChatController,
    view: &ChatView<'_>,
) -> FrameMetrics {
    let lines = build_display_lines(controller, view.theme, area.width, Instant::now());

    let available_height = area.height.saturating_sub(1); // title row
    let window = transcript_window(
        lines.len(),
        available_height,
        controller.document().scroll_back(),
    );
    let scroll_back = window.scroll_back;

    let title = if scroll_back > 0 {
        format!("{} • ↑{scroll_back}", view.title)
    } else {
        view.title.to_string()
    };

    // Slice before building the paragraph; its scroll offset is only u16.
    let visible: Vec<Line<'static>> = lines
        .into_iter()
        .skip(window.start)
        .take(available_height as usize)
        .collect();
    let paragraph = Paragraph::new(visible)
        .style(Style::default().bg(view.theme.background_color))
        .block(Block::default().title(Span::styled(title, view.theme.title_style)));
    f.render_widget(paragraph, area);

    FrameMetrics {
        transcript_height: available_height,
        max_scroll_back: window.max_scroll_back,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TranscriptWindow {
    /// Index of the first visible line.
    start: usize,
    scroll_back: u16,
    max_scroll_back: u16,
}

/// Which slice of `total` lines to show, counting scroll-back from the
/// bottom so the newest line stays reachable however long the transcript.
fn transcript_window(total: usize, height: u16, scroll_back: u16) -> TranscriptWindow {
    let bottom_start = total.saturating_sub(height as usize);
    let max_scroll_back = bottom_start.min(u16::MAX as usize) as u16;
    let scroll_back = scroll_back.min(max_scroll_back);
    TranscriptWindow {
        start: bottom_start - scroll_back as usize,
        scroll_back,
        max_scroll_back,
    }
}

fn button(label: &str, enabled: bool, theme: &Theme) -> Span<'static> {
    let style = if enabled {
        theme.button_enabled_style
    } else {
        theme.button_disabled_style
    };
    Span::styled(format!("[ {label} ]"), style)
}

fn render_input(f: &mut Frame, area: Rect, controller: &ChatController, theme: &Theme) {
    let form = controller.form();
    let title = match controller.notice() {
        Some(notice) => Span::styled(notice.to_string(), theme.notice_style),
        None => Span::styled(INPUT_HINT, theme.title_style),
    };
    let buttons = Line::from(vec![
        button("Clear", controller.document().is_clear_enabled(), theme),
        Span::raw(" "),
        button("Send", form.submit_enabled(), theme),
    ])
    .right_aligned();

    let text_style = if form.input_enabled() {
        theme.input_text_style
    } else {
        theme.input_disabled_style
    };

    let textarea = form.textarea();
    let (cursor_row, cursor_col) = textarea.cursor();
    let visible_rows = area.height.saturating_sub(2);
    let scroll_row = (cursor_row as u16).saturating_sub(visible_rows.saturating_sub(1));

    let lines: Vec<Line> = textarea
        .lines()
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();
    let input = Paragraph::new(lines)
        .style(text_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.input_border_style)
                .title(title)
                .title_bottom(buttons),
        )
        .scroll((scroll_row, 0));
    f.render_widget(input, area);

    if form.input_enabled() {
        let line = textarea
            .lines()
            .get(cursor_row)
            .map(String::as_str)
            .unwrap_or("");
        let prefix: String = line.chars().take(cursor_col).collect();
        let x = (prefix.width() as u16 + 1).min(area.width.saturating_sub(2));
        let y = cursor_row as u16 - scroll_row + 1;
        f.set_cursor_position((area.x + x, area.y + y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_controller;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(controller: &ChatController, width: u16, height: u16) -> (FrameMetrics, String) {
        let theme = Theme::dark_default();
        let view = ChatView {
            theme: &theme,
            title: "chatbox",
        };
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        let mut metrics = FrameMetrics::default();
        terminal
            .draw(|f| metrics = ui(f, controller, &view))
            .expect("draw");
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..height {
            for x in 0..width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        (metrics, text)
    }

    #[test]
    fn window_follows_the_bottom_past_u16_lines() {
        let window = transcript_window(70_000, 20, 0);
        assert_eq!(window.start, 69_980);
        assert_eq!(window.scroll_back, 0);
        assert_eq!(window.max_scroll_back, u16::MAX);

        let window = transcript_window(70_000, 20, 100);
        assert_eq!(window.start, 69_880);
        assert_eq!(window.scroll_back, 100);
    }

    #[test]
    fn window_clamps_scroll_back_to_content() {
        let window = transcript_window(30, 20, 50);
        assert_eq!(window.start, 0);
        assert_eq!(window.scroll_back, 10);
        assert_eq!(window.max_scroll_back, 10);

        let short = transcript_window(5, 20, 3);
        assert_eq!(short.start, 0);
        assert_eq!(short.max_scroll_back, 0);
    }

    #[test]
    fn buttons_reflect_control_state() {
        let mut controller = create_test_controller();
        let (_, screen) = draw(&controller, 80, 12);
        assert!(screen.contains("[ Send ]"));
        assert!(screen.contains("[ Clear ]"));

        controller.render_user_message("hello");
        let (_, screen) = draw(&controller, 80, 12);
        assert!(screen.contains("hello"));
    }

    #[test]
    fn long_transcripts_report_scroll_range() {
        let mut controller = create_test_controller();
        for i in 0..20 {
            controller.render_user_message(&format!("message {i}"));
        }
        let (metrics, screen) = draw(&controller, 40, 12);
        assert!(metrics.max_scroll_back > 0);
        assert!(screen.contains("message 19"));
        assert!(!screen.contains("message 0 "));
    }

    #[test]
    fn notices_replace_the_hint() {
        let mut controller = create_test_controller();
        let submission = controller.begin_submit("hi").expect("submission");
        controller.finish_submit(
            &submission,
            Err(crate::utils::test_utils::http_error(500)),
        );
        let (_, screen) = draw(&controller, 120, 12);
        assert!(screen.contains("Send failed"));
    }
}
