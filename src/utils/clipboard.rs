use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// None of the known clipboard commands is installed.
    NoCommand,
    /// A clipboard command ran but exited unsuccessfully.
    CommandFailed(String),
    /// The platform refused the write (used by non-process clipboards).
    Denied(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::NoCommand => write!(
                f,
                "No clipboard command found (install wl-copy, xclip, or xsel)"
            ),
            ClipboardError::CommandFailed(cmd) => write!(f, "Clipboard command `{cmd}` failed"),
            ClipboardError::Denied(reason) => write!(f, "Clipboard write denied: {reason}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Write access to the system clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard backed by the platform's copy command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        copy_to_clipboard(text)
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    #[cfg(target_os = "macos")]
    {
        return run_with_stdin("pbcopy", &[], text);
    }
    #[cfg(target_os = "windows")]
    {
        return run_with_stdin("cmd", &["/C", "clip"], text);
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let candidates: [(&str, &[&str]); 3] = [
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
        ];
        let mut last_failure = None;
        for (cmd, args) in candidates {
            match run_with_stdin(cmd, args, text) {
                Ok(()) => return Ok(()),
                Err(ClipboardError::NoCommand) => {}
                Err(err) => last_failure = Some(err),
            }
        }
        Err(last_failure.unwrap_or(ClipboardError::NoCommand))
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), ClipboardError> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| ClipboardError::NoCommand)?;

    if let Some(mut stdin) = child.stdin.take() {
        if stdin.write_all(input.as_bytes()).is_err() {
            drop(stdin);
            // Reap the child so it does not linger as a zombie.
            let _ = child.wait();
            return Err(ClipboardError::CommandFailed(cmd.to_string()));
        }
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(ClipboardError::CommandFailed(cmd.to_string())),
    }
}
