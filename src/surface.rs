//! Output surfaces for the gate and feed.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gate and feed never print directly. They hand rendered views, user
//! notices, input clears and login redirects to a `Surface`, so the same
//! logic drives the terminal in `main` and a recorder in tests.

use std::io::{IsTerminal, Write};
use std::sync::Mutex;

use crate::render::FeedView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message: the terminal's equivalent of an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

pub trait Surface: Send + Sync {
    /// Replace the displayed list with `view` and scroll to the newest entry.
    fn show_feed(&self, view: &FeedView);

    fn notify(&self, notice: &Notice);

    /// Clear the pending message input after a successful send.
    fn clear_input(&self);

    /// Send the user back to the login step.
    fn redirect_to_login(&self);
}

// =============================================================================
// TERMINAL
// =============================================================================

/// Writes the feed to stdout and notices to stderr.
pub struct TerminalSurface {
    mode: FeedMode,
    last_view: Mutex<Option<FeedView>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedMode {
    Append,
    Repaint,
    Hidden,
}

impl TerminalSurface {
    /// Append each view to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(FeedMode::Append)
    }

    /// Repaint the whole screen per view when stdout is a terminal.
    #[must_use]
    pub fn full_screen() -> Self {
        if std::io::stdout().is_terminal() {
            Self::with_mode(FeedMode::Repaint)
        } else {
            Self::new()
        }
    }

    /// Show notices only; stdout is left to the caller.
    #[must_use]
    pub fn notices_only() -> Self {
        Self::with_mode(FeedMode::Hidden)
    }

    fn with_mode(mode: FeedMode) -> Self {
        Self { mode, last_view: Mutex::new(None) }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn show_feed(&self, view: &FeedView) {
        if self.mode == FeedMode::Hidden {
            return;
        }
        let Ok(mut last) = self.last_view.lock() else {
            return;
        };
        if last.as_ref() == Some(view) {
            return;
        }

        let mut out = std::io::stdout().lock();
        if self.mode == FeedMode::Repaint {
            // Clear screen and home the cursor; the newest line ends up at the bottom.
            let _ = write!(out, "\x1b[2J\x1b[H");
        }
        for line in view.lines() {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
        *last = Some(view.clone());
    }

    fn notify(&self, notice: &Notice) {
        let prefix = match notice.level {
            NoticeLevel::Info => "",
            NoticeLevel::Error => "error: ",
        };
        eprintln!("{prefix}{}", notice.text);
    }

    fn clear_input(&self) {
        // Line-based stdin has already consumed the input line.
    }

    fn redirect_to_login(&self) {
        if let Ok(mut last) = self.last_view.lock() {
            *last = None;
        }
        eprintln!("Not logged in. Run `chatterm login <user>` or `chatterm signup <user>`.");
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "surface_test.rs"]
mod tests;
