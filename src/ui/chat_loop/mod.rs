//! Interactive chat session: terminal setup, event loop and key handling.

mod event_loop;
pub mod keybindings;
pub mod lifecycle;
mod setup;

pub use event_loop::{handle_event, run_chat, EventOutcome, Spawner, UiEvent};
pub use setup::{bootstrap_session, ChatSession};
