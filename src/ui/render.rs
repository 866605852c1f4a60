//! Turn the chat document into pre-wrapped display lines.
//!
//! Wrapping happens here rather than in `Paragraph` so the renderer knows the
//! exact line count for scrolling.

use std::time::Instant;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::core::controller::ChatController;
use crate::core::copy::{CopyControl, CopyFeedback};
use crate::core::document::{CopyTarget, MessageBody, MessageNode, TypingIndicator};
use crate::core::markup::{Block, CodeBlock, Emphasis, Inline};
use crate::ui::theme::Theme;

const TYPING_FRAME_MS: u128 = 350;

pub fn build_display_lines(
    controller: &ChatController,
    theme: &Theme,
    width: u16,
    now: Instant,
) -> Vec<Line<'static>> {
    let width = usize::from(width).max(1);
    let selected = controller.selected_copy();
    let mut lines = Vec::new();

    for node in controller.document().messages() {
        match &node.body {
            MessageBody::Text { text, copy } => {
                push_user_message(&mut lines, node, text, copy.as_ref(), selected, theme, width)
            }
            MessageBody::Markup { blocks, .. } => {
                push_bot_message(&mut lines, node, blocks, selected, theme, width)
            }
        }
        lines.push(Line::from(""));
    }

    if let Some(typing) = controller.document().typing() {
        lines.push(typing_line(typing, theme, now));
    }

    lines
}

fn push_user_message(
    lines: &mut Vec<Line<'static>>,
    node: &MessageNode,
    text: &str,
    copy: Option<&CopyControl>,
    selected: Option<CopyTarget>,
    theme: &Theme,
    width: usize,
) {
    let mut header = vec![Span::styled("You", theme.user_prefix_style)];
    if let Some(copy) = copy {
        let target = CopyTarget {
            node: node.id,
            code_block: None,
        };
        header.push(Span::raw("  "));
        header.push(copy_glyph(copy, selected == Some(target), theme));
    }
    lines.push(Line::from(header));

    for raw in text.split('\n') {
        let span = Span::styled(raw.to_string(), theme.user_text_style);
        lines.extend(wrap_spans(&[span], width));
    }
}

fn push_bot_message(
    lines: &mut Vec<Line<'static>>,
    node: &MessageNode,
    blocks: &[Block],
    selected: Option<CopyTarget>,
    theme: &Theme,
    width: usize,
) {
    let mut code_index = 0;
    for (position, block) in blocks.iter().enumerate() {
        if position > 0 {
            lines.push(Line::from(""));
        }
        match block {
            Block::Text(paragraph) => {
                for line in paragraph {
                    let spans: Vec<Span<'static>> =
                        line.iter().map(|inline| inline_span(inline, theme)).collect();
                    lines.extend(wrap_spans(&spans, width));
                }
            }
            Block::Code(code) => {
                let target = CopyTarget {
                    node: node.id,
                    code_block: Some(code_index),
                };
                code_index += 1;
                push_code_block(lines, code, selected == Some(target), theme, width);
            }
        }
    }
}

fn push_code_block(
    lines: &mut Vec<Line<'static>>,
    code: &CodeBlock,
    selected: bool,
    theme: &Theme,
    width: usize,
) {
    let mut header = Vec::new();
    if let Some(badge) = &code.badge {
        header.push(Span::styled(format!(" {badge} "), theme.badge_style));
    }
    if let Some(copy) = &code.copy {
        if !header.is_empty() {
            header.push(Span::raw(" "));
        }
        header.push(copy_glyph(copy, selected, theme));
    }
    if !header.is_empty() {
        lines.push(Line::from(header));
    }

    let base = theme.code_block_style();
    match &code.highlighted {
        Some(highlighted) => {
            for line in highlighted {
                let spans: Vec<Span<'static>> = line
                    .spans
                    .iter()
                    .map(|span| Span::styled(span.content.to_string(), base.patch(span.style)))
                    .collect();
                lines.extend(wrap_spans(&spans, width));
            }
        }
        None => {
            for raw in code.text.split('\n') {
                lines.extend(wrap_spans(&[Span::styled(raw.to_string(), base)], width));
            }
        }
    }
}

fn inline_span(inline: &Inline, theme: &Theme) -> Span<'static> {
    let style = match inline.emphasis {
        Emphasis::Plain => theme.bot_text_style,
        Emphasis::Strong => theme.strong_style,
        Emphasis::Emphasis => theme.emphasis_style,
        Emphasis::Code => theme.inline_code_style,
        Emphasis::Link => theme.link_style,
    };
    Span::styled(inline.text.clone(), style)
}

fn copy_glyph(copy: &CopyControl, selected: bool, theme: &Theme) -> Span<'static> {
    let style = match copy.feedback() {
        CopyFeedback::Copied { .. } => theme.copy_success_style,
        CopyFeedback::Failed { .. } => theme.copy_failed_style,
        CopyFeedback::Idle | CopyFeedback::Pending => theme.copy_idle_style,
    };
    let style = if selected {
        style.patch(theme.selection_style)
    } else {
        style
    };
    Span::styled(format!("[{}]", copy.glyph()), style)
}

pub fn typing_line(typing: TypingIndicator, theme: &Theme, now: Instant) -> Line<'static> {
    let frame = now.saturating_duration_since(typing.started).as_millis() / TYPING_FRAME_MS;
    let dots = ".".repeat((frame % 4) as usize);
    Line::from(Span::styled(
        format!("Bot is typing{dots}"),
        theme.typing_indicator_style,
    ))
}

/// Greedy word wrap over styled spans, measured in terminal columns.
/// Words longer than `width` are split.
pub fn wrap_spans(spans: &[Span<'static>], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current: Vec<(char, Style)> = Vec::new();
    let mut current_width = 0usize;
    let mut last_space: Option<usize> = None;

    for span in spans {
        for ch in span.content.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if current_width + ch_width > width && !current.is_empty() {
                match last_space {
                    Some(index) if index > 0 => {
                        let rest = current.split_off(index + 1);
                        current.pop();
                        lines.push(to_line(&current));
                        current = rest;
                    }
                    _ => {
                        lines.push(to_line(&current));
                        current.clear();
                    }
                }
                current_width = current.iter().map(|(c, _)| c.width().unwrap_or(0)).sum();
                last_space = None;
                if ch == ' ' && current.is_empty() {
                    continue;
                }
            }
            if ch == ' ' {
                last_space = Some(current.len());
            }
            current.push((ch, span.style));
            current_width += ch_width;
        }
    }

    lines.push(to_line(&current));
    lines
}

fn to_line(chars: &[(char, Style)]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style: Option<Style> = None;
    for (ch, style) in chars {
        if run_style != Some(*style) {
            if let Some(previous) = run_style {
                spans.push(Span::styled(std::mem::take(&mut run), previous));
            }
            run_style = Some(*style);
        }
        run.push(*ch);
    }
    if let Some(style) = run_style {
        spans.push(Span::styled(run, style));
    }
    Line::from(spans)
}

pub fn line_to_string(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}
