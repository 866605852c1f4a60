//! Terminal UI layer for the interactive chat session.
//!
//! - [`chat_loop`]: the event loop that feeds key presses and finished
//!   background work into the [`ChatController`](crate::core::controller::ChatController).
//! - [`render`] and [`renderer`]: turn the chat document into a frame.
//! - [`theme`]: color and style policy.
//!
//! This layer only reads the document; all mutation goes through the
//! controller.

pub mod chat_loop;
pub mod render;
pub mod renderer;
pub mod theme;
