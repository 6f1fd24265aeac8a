//! Domain and wire types shared by the session gate and message feed.
//!
//! DESIGN
//! ======
//! `Credential` and `Message` are the only domain values the client keeps.
//! Everything else here mirrors a JSON shape exchanged with `/api/chat/*`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// DOMAIN
// =============================================================================

/// Username/token pair proving an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub token: String,
}

impl Credential {
    #[must_use]
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self { username: username.into(), token: token.into() }
    }

    /// A credential missing either half is treated as absent.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.token.trim().is_empty()
    }

    /// Value for the `Auth` header on message fetches.
    #[must_use]
    pub fn auth_header(&self) -> String {
        format!("{}:{}", self.username, self.token)
    }
}

/// A single server-owned chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub content: String,
    /// Milliseconds since the Unix epoch, when the server supplied one.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<i64>,
}

// =============================================================================
// WIRE: /api/chat/auth
// =============================================================================

/// Body of `POST /api/chat/auth`, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthRequest {
    Login { user: String, password: String },
    New { user: String, password: String },
    Check { user: String, token: String },
}

impl AuthRequest {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::New { .. } => "new",
            Self::Check { .. } => "check",
        }
    }
}

/// Success body of an auth exchange. Login answers `{token}`; signup on the
/// chat backend answers `{success}` without a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub success: Option<String>,
}

/// Failure body carried by any non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// =============================================================================
// WIRE: /api/chat/messages, /api/chat/send
// =============================================================================

/// Body of `GET /api/chat/messages`. A missing or null list reads as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default, deserialize_with = "deserialize_messages")]
    pub messages: Vec<Message>,
}

/// Body of `POST /api/chat/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRequest {
    pub user: String,
    pub content: String,
    pub token: String,
}

// =============================================================================
// LENIENT DESERIALIZERS
// =============================================================================

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(timestamp_from_value))
}

#[allow(clippy::cast_possible_truncation)]
fn timestamp_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn deserialize_messages<'de, D>(deserializer: D) -> Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Message>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
