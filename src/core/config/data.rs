use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Address of the chat server (e.g., "http://127.0.0.1:5000")
    pub server_url: Option<String>,
    /// Path messages are posted to, relative to the server URL
    pub send_path: Option<String>,
    /// Path that resets the server-side conversation
    pub clear_path: Option<String>,
    /// Show the typing indicator while a reply is pending
    pub typing_indicator: Option<bool>,
    /// Enable syntax highlighting for code blocks in replies
    pub syntax: Option<bool>,
    /// UI theme name ("dark" or "light")
    pub theme: Option<String>,
    /// Give up on a request after this many seconds. Unset waits forever.
    pub request_timeout_secs: Option<u64>,
    /// Replay the server's existing conversation at startup
    pub load_history: Option<bool>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
