//! Message list rendering.
//!
//! DESIGN
//! ======
//! Message content is untrusted. HTML output entity-escapes every field and
//! terminal output neutralises control characters, so a message can neither
//! inject markup nor drive the terminal with escape sequences.

use time::OffsetDateTime;
use time::macros::format_description;

use crate::types::Message;

pub const EMPTY_PLACEHOLDER: &str = "No messages to display.";
const UNKNOWN_TIME: &str = "--:--:--";

/// Snapshot handed to a surface on every successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedView {
    /// The server returned no messages.
    Empty,
    /// One rendered line per message, oldest first.
    Messages(Vec<String>),
}

impl FeedView {
    #[must_use]
    pub fn from_messages(messages: &[Message]) -> Self {
        if messages.is_empty() {
            return Self::Empty;
        }
        Self::Messages(messages.iter().map(format_line).collect())
    }

    /// Lines to display, including the placeholder when empty.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Empty => vec![EMPTY_PLACEHOLDER.to_owned()],
            Self::Messages(lines) => lines.clone(),
        }
    }
}

/// Escape `& < > " '` for inclusion in HTML text or attributes.
#[must_use]
pub fn escape_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Replace control characters with visible `\u{..}` escapes.
#[must_use]
pub fn sanitize_terminal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_control() {
            out.extend(ch.escape_unicode());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `HH:MM:SS` in UTC for a millisecond timestamp.
#[must_use]
pub fn format_timestamp(millis: Option<i64>) -> String {
    let Some(millis) = millis else {
        return UNKNOWN_TIME.to_owned();
    };
    let Ok(at) = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000) else {
        return UNKNOWN_TIME.to_owned();
    };
    at.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| UNKNOWN_TIME.to_owned())
}

/// `[HH:MM:SS] user: content`, safe to print to a terminal.
#[must_use]
pub fn format_line(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        format_timestamp(message.timestamp),
        sanitize_terminal(&message.user),
        sanitize_terminal(&message.content)
    )
}

/// Render the full list as HTML fragments, one `div` per message.
#[must_use]
pub fn render_html(messages: &[Message]) -> String {
    if messages.is_empty() {
        return format!("<div class=\"empty\">{EMPTY_PLACEHOLDER}</div>");
    }
    messages
        .iter()
        .map(|m| {
            format!(
                "<div class=\"message\">[{}] {}: {}</div>",
                format_timestamp(m.timestamp),
                escape_markup(&m.user),
                escape_markup(&m.content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
