//! Diagnostic logging setup.
//!
//! Conversation transcripts live in [`crate::utils::logging`]; this module
//! only wires `tracing` output.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "CHATBOX_LOG";
pub const DEFAULT_DIRECTIVE: &str = "chatbox=info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber.
///
/// With `debug_log` set, events go to that file. Otherwise they go to
/// stderr, except in the TUI where stderr is the screen being drawn on and
/// nothing is installed.
pub fn init_tracing(debug_log: Option<&Path>, interactive: bool) -> Result<(), Box<dyn Error>> {
    match debug_log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|err| err as Box<dyn Error>)?;
        }
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| err as Box<dyn Error>)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tui_without_debug_log_installs_nothing() {
        assert!(init_tracing(None, true).is_ok());
    }

    #[test]
    fn second_subscriber_is_reported_as_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("debug.log");
        let _ = init_tracing(Some(&path), false);
        assert!(path.exists());
        let err = init_tracing(Some(&path), false).expect_err("global subscriber already set");
        assert!(!err.to_string().is_empty());
    }
}
