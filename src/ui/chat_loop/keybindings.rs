//! Map key presses to chat actions.
//!
//! Resolution is pure so the table can be tested without a terminal.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const SCROLL_STEP: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Submit,
    InsertNewline,
    /// Forward the key to the input buffer.
    Edit(KeyEvent),
    NextCopyTarget,
    PreviousCopyTarget,
    ClearSelection,
    Copy,
    ClearConversation,
    ScrollUp(u16),
    ScrollDown(u16),
    PageUp,
    PageDown,
    ScrollToLatest,
    Ignore,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyContext {
    pub copy_selected: bool,
}

pub fn resolve_key(key: KeyEvent, context: KeyContext) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => KeyAction::Quit,
        KeyCode::Enter if alt || shift => KeyAction::InsertNewline,
        KeyCode::Char('j') if ctrl => KeyAction::InsertNewline,
        KeyCode::Enter if context.copy_selected && !ctrl => KeyAction::Copy,
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Tab => KeyAction::PreviousCopyTarget,
        KeyCode::BackTab => KeyAction::NextCopyTarget,
        KeyCode::Esc => KeyAction::ClearSelection,
        KeyCode::Char('y') if ctrl => KeyAction::Copy,
        KeyCode::Char('l') if ctrl => KeyAction::ClearConversation,
        KeyCode::Up if ctrl => KeyAction::ScrollUp(SCROLL_STEP),
        KeyCode::Down if ctrl => KeyAction::ScrollDown(SCROLL_STEP),
        KeyCode::PageUp => KeyAction::PageUp,
        KeyCode::PageDown => KeyAction::PageDown,
        KeyCode::End if ctrl => KeyAction::ScrollToLatest,
        KeyCode::Char(_)
        | KeyCode::Backspace
        | KeyCode::Delete
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End => KeyAction::Edit(key),
        _ => KeyAction::Ignore,
    }
}
