//! Terminal client for the `/api/chat/*` chat service.
//!
//! ARCHITECTURE
//! ============
//! - `session`: the gate. Login, signup, validation, logout.
//! - `feed`: full-list polling and message send, plus the cancellable poller.
//! - `app`: wires the two together behind an input loop.
//! - `api`: the HTTP transport behind the `ChatBackend` seam.
//! - `store`: credential persistence behind the `CredentialStore` seam.
//! - `render` / `surface`: escaping, formatting and output.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod feed;
pub mod render;
pub mod session;
pub mod store;
pub mod surface;
pub mod types;

pub use error::ChatError;
pub use types::{Credential, Message};
