//! Client error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Every gate/feed operation returns `Result<_, ChatError>`. Callers recover
//! locally: the gate and feed report the error through the `Surface` before
//! returning it, and the poller only logs. Nothing is escalated past `main`.

use reqwest::StatusCode;

/// Errors produced by session and feed operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A required field was empty; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server rejected the supplied credentials or token.
    #[error("{0}")]
    Auth(String),

    /// The request failed before a response arrived.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A success response carried a body we could not understand.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The persisted credential could not be read or written.
    #[error("credential storage failed: {0}")]
    Storage(String),

    /// Reading user input failed.
    #[error("reading input failed: {0}")]
    Input(String),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ChatError {
    /// Build the error for a non-2xx response, preferring the server's `error` text.
    #[must_use]
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Self::Auth(message);
        }
        Self::Server { status: status.as_u16(), message }
    }

    /// Short machine-readable code, used as a structured log field.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Auth(_) => "E_AUTH",
            Self::Network(_) => "E_NETWORK",
            Self::Server { .. } => "E_SERVER",
            Self::Decode(_) => "E_DECODE",
            Self::Storage(_) => "E_STORAGE",
            Self::Input(_) => "E_INPUT",
            Self::Config(_) => "E_CONFIG",
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
