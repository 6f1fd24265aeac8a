//! Interactive chat session: gate first, then feed plus input loop.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ChatApp` wires the session gate to the message feed. The poller only
//! runs while the gate is `Authenticated`: it starts after `start` (or a
//! login) succeeds and is cancelled on logout and on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::api::ChatBackend;
use crate::error::ChatError;
use crate::feed::{MessageFeed, PollHandle, SharedFeed, spawn_poller};
use crate::session::{SessionGate, SessionState};
use crate::store::CredentialStore;
use crate::surface::{Notice, Surface};

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Send(String),
    Refresh,
    Logout,
    Quit,
}

impl InputCommand {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/refresh" => Self::Refresh,
            "/logout" => Self::Logout,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Send(line.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

pub struct ChatApp {
    gate: SessionGate,
    feed: SharedFeed,
    surface: Arc<dyn Surface>,
    poll_interval: Duration,
    poller: Option<PollHandle>,
}

impl ChatApp {
    #[must_use]
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        store: Arc<dyn CredentialStore>,
        surface: Arc<dyn Surface>,
        poll_interval: Duration,
    ) -> Self {
        let gate = SessionGate::new(backend.clone(), store.clone(), surface.clone());
        let feed = MessageFeed::new(backend, store, surface.clone()).shared();
        Self { gate, feed, surface, poll_interval, poller: None }
    }

    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    #[must_use]
    pub fn feed(&self) -> SharedFeed {
        self.feed.clone()
    }

    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Restore the session and, if it validates, start polling.
    pub async fn start(&mut self) -> bool {
        let authenticated = self.gate.restore().await.is_authenticated();
        if authenticated {
            self.activate();
        }
        authenticated
    }

    /// Start the poller. No-op when the gate is not authenticated or a poller is already running.
    pub fn activate(&mut self) {
        if !self.gate.state().is_authenticated() || self.is_polling() {
            return;
        }
        debug!(interval_ms = self.poll_interval.as_millis(), "starting poller");
        self.poller = Some(spawn_poller(self.feed.clone(), self.poll_interval));
    }

    /// Cancel the poller, then log out through the gate.
    ///
    /// # Errors
    ///
    /// `Storage` if the credential could not be removed.
    pub async fn logout(&mut self) -> Result<(), ChatError> {
        self.stop_polling().await;
        self.gate.logout().await
    }

    /// Cancel the poller without touching the session.
    pub async fn shutdown(&mut self) {
        self.stop_polling().await;
    }

    /// Apply one input command.
    ///
    /// # Errors
    ///
    /// Propagates logout storage failures. Send and refresh failures are
    /// already on the surface and do not stop the loop.
    pub async fn handle(&mut self, command: InputCommand) -> Result<LoopControl, ChatError> {
        match command {
            InputCommand::Send(content) => {
                let _ = self.feed.lock().await.send(&content).await;
                Ok(LoopControl::Continue)
            }
            InputCommand::Refresh => {
                if let Err(e) = self.feed.lock().await.poll().await {
                    self.surface.notify(&Notice::error(format!("Refresh failed: {e}")));
                }
                Ok(LoopControl::Continue)
            }
            InputCommand::Logout => {
                self.logout().await?;
                Ok(LoopControl::Stop)
            }
            InputCommand::Quit => Ok(LoopControl::Stop),
        }
    }

    /// Gate, then read commands from `input` until quit, logout, or EOF.
    ///
    /// # Errors
    ///
    /// `Auth` when there is no valid session to start from; otherwise any error
    /// from [`ChatApp::handle`] or from reading input.
    pub async fn run<R>(&mut self, input: R) -> Result<(), ChatError>
    where
        R: AsyncBufRead + Unpin,
    {
        if !self.start().await {
            return Err(ChatError::Auth("not logged in".to_owned()));
        }
        if let SessionState::Authenticated(credential) = self.gate.state() {
            info!(user = %credential.username, "chat session started");
        }

        let mut lines = input.lines();
        let result = loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(()),
                Err(e) => break Err(ChatError::Input(e.to_string())),
            };
            match self.handle(InputCommand::parse(&line)).await {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Stop) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.shutdown().await;
        result
    }

    async fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel().await;
            debug!("poller cancelled");
        }
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
