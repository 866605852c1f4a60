//! Chatbox is a terminal front-end for a form-based chat server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat document, the input form and the controller that
//!   runs each exchange with the server, plus the transport seam and config.
//! - [`api`] defines the request and reply shapes and decodes legacy HTML
//!   pages into them.
//! - [`ui`] renders the document and runs the interactive event loop.
//! - [`utils`] holds clipboard, syntax highlighting, URL and transcript
//!   helpers.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
