//! Client configuration.
//!
//! DESIGN
//! ======
//! `main` fills `ClientConfig` from clap arguments, which already fall back
//! to environment variables. `from_env` builds the same config without clap
//! for library users. Either path goes through `validate`.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ChatError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const CREDENTIAL_DIR: &str = "chatterm";
const CREDENTIAL_FILE: &str = "credential.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without trailing slash (e.g. `"http://127.0.0.1:8080"`).
    pub base_url: String,
    /// Where the credential JSON file lives.
    pub credential_path: PathBuf,
    /// Fixed delay between feed polls.
    pub poll_interval: Duration,
    /// Whole-request timeout for every HTTP exchange.
    pub request_timeout: Duration,
    /// TCP connect timeout for every HTTP exchange.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Build a validated config.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Config` if the base URL is not http(s) or an
    /// interval/timeout is zero.
    pub fn new(
        base_url: &str,
        credential_path: Option<PathBuf>,
        poll_interval_ms: u64,
        request_timeout_secs: u64,
    ) -> Result<Self, ChatError> {
        let config = Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            credential_path: credential_path.unwrap_or_else(default_credential_path),
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS.min(request_timeout_secs.max(1))),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `CHAT_BASE_URL`: default `http://127.0.0.1:8080`
    /// - `CHAT_CREDENTIAL_FILE`: default `<config dir>/chatterm/credential.json`
    /// - `CHAT_POLL_INTERVAL_MS`: default 3000
    /// - `CHAT_REQUEST_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Config` when a value fails validation.
    pub fn from_env() -> Result<Self, ChatError> {
        let base_url = std::env::var("CHAT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let credential_path = std::env::var("CHAT_CREDENTIAL_FILE")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        Self::new(
            &base_url,
            credential_path,
            env_parse("CHAT_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS),
            env_parse("CHAT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    fn validate(&self) -> Result<(), ChatError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ChatError::Config(format!("base URL must be http(s): {}", self.base_url)));
        }
        if self.poll_interval.is_zero() {
            return Err(ChatError::Config("poll interval must be greater than zero".to_owned()));
        }
        if self.request_timeout.is_zero() {
            return Err(ChatError::Config("request timeout must be greater than zero".to_owned()));
        }
        Ok(())
    }

    /// Join an API path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// `<config dir>/chatterm/credential.json`, or the working directory when the
/// platform has no config dir.
#[must_use]
pub fn default_credential_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(CREDENTIAL_DIR))
        .unwrap_or_default()
        .join(CREDENTIAL_FILE)
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
