//! Copy-to-clipboard controls attached to user messages and code blocks.

use std::time::{Duration, Instant};

/// How long the success glyph stays up after a copy.
pub const COPY_SUCCESS_FEEDBACK: Duration = Duration::from_millis(1400);
/// How long the failure glyph stays up after a rejected clipboard write.
pub const COPY_FAILURE_FEEDBACK: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFeedback {
    Idle,
    /// Clipboard write dispatched, result not back yet.
    Pending,
    Copied { until: Instant },
    Failed { until: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyControl {
    feedback: CopyFeedback,
}

impl Default for CopyControl {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyControl {
    pub fn new() -> Self {
        Self {
            feedback: CopyFeedback::Idle,
        }
    }

    pub fn feedback(&self) -> CopyFeedback {
        self.feedback
    }

    pub fn glyph(&self) -> &'static str {
        match self.feedback {
            CopyFeedback::Idle => "⧉ copy",
            CopyFeedback::Pending => "… copy",
            CopyFeedback::Copied { .. } => "✓ copied",
            CopyFeedback::Failed { .. } => "✗ failed",
        }
    }

    /// Mark the control as busy. Returns false if a write is already pending.
    pub fn begin(&mut self) -> bool {
        if self.feedback == CopyFeedback::Pending {
            return false;
        }
        self.feedback = CopyFeedback::Pending;
        true
    }

    pub fn finish(&mut self, succeeded: bool, now: Instant) {
        self.feedback = if succeeded {
            CopyFeedback::Copied {
                until: now + COPY_SUCCESS_FEEDBACK,
            }
        } else {
            CopyFeedback::Failed {
                until: now + COPY_FAILURE_FEEDBACK,
            }
        };
    }

    /// Revert expired feedback to idle. Returns true when the glyph changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.feedback {
            CopyFeedback::Copied { until } | CopyFeedback::Failed { until } if now >= until => {
                self.feedback = CopyFeedback::Idle;
                true
            }
            _ => false,
        }
    }
}
