//! Message feed: full-list polling and message send.
//!
//! DESIGN
//! ======
//! Every poll fetches the whole list and replaces what is displayed; there
//! is no incremental merge. `spawn_poller` polls once immediately and then
//! on a fixed interval until its `PollHandle` is cancelled or dropped, which
//! scopes the timer to the authenticated session.
//!
//! ERROR HANDLING
//! ==============
//! Poll failures are logged only and leave the previous rendering in place.
//! Send failures are always shown on the surface.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::api::ChatBackend;
use crate::error::ChatError;
use crate::render::FeedView;
use crate::session::user_text;
use crate::store::CredentialStore;
use crate::surface::{Notice, Surface};
use crate::types::{Credential, Message, SendRequest};

const EMPTY_CONTENT: &str = "Please enter a message.";
const NO_CREDENTIAL: &str = "Not logged in; cannot send.";

pub struct MessageFeed {
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn CredentialStore>,
    surface: Arc<dyn Surface>,
    /// Currently displayed list. Last write wins.
    rendered: Vec<Message>,
}

/// Feed shared between the poller task and the input loop.
pub type SharedFeed = Arc<Mutex<MessageFeed>>;

impl MessageFeed {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>, store: Arc<dyn CredentialStore>, surface: Arc<dyn Surface>) -> Self {
        Self { backend, store, surface, rendered: Vec::new() }
    }

    #[must_use]
    pub fn shared(self) -> SharedFeed {
        Arc::new(Mutex::new(self))
    }

    /// The list as last rendered.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.rendered
    }

    /// Fetch the full list and repaint.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after logging it; the rendering is untouched.
    pub async fn poll(&mut self) -> Result<Vec<Message>, ChatError> {
        let credential = self.current_credential().await;
        match self.backend.fetch_messages(credential.as_ref()).await {
            Ok(messages) => {
                debug!(count = messages.len(), "feed refreshed");
                self.surface.show_feed(&FeedView::from_messages(&messages));
                self.rendered.clone_from(&messages);
                Ok(messages)
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "message poll failed");
                Err(e)
            }
        }
    }

    /// Post `content` as the stored user, then re-poll once.
    ///
    /// # Errors
    ///
    /// `Validation` for empty content or a missing credential (no request
    /// sent), otherwise the send failure. A failing follow-up poll is not an
    /// error here.
    pub async fn send(&mut self, content: &str) -> Result<(), ChatError> {
        let content = content.trim();
        if content.is_empty() {
            self.surface.notify(&Notice::error(EMPTY_CONTENT));
            return Err(ChatError::Validation(EMPTY_CONTENT.to_owned()));
        }
        let Some(credential) = self.current_credential().await else {
            self.surface.notify(&Notice::error(NO_CREDENTIAL));
            return Err(ChatError::Validation(NO_CREDENTIAL.to_owned()));
        };

        let request = SendRequest {
            user: credential.username,
            content: content.to_owned(),
            token: credential.token,
        };
        if let Err(e) = self.backend.send_message(&request).await {
            warn!(code = e.code(), error = %e, "message send failed");
            self.surface.notify(&Notice::error(user_text("Send", &e)));
            return Err(e);
        }

        self.surface.clear_input();
        let _ = self.poll().await;
        Ok(())
    }

    async fn current_credential(&self) -> Option<Credential> {
        match self.store.load().await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "credential load failed");
                None
            }
        }
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Running poll timer. Dropping the handle also stops it.
pub struct PollHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the timer and wait for the task to exit. An in-flight poll is abandoned.
    pub async fn cancel(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!(error = %e, "poller task ended abnormally");
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Poll now, then every `period`, until the handle is cancelled or dropped.
#[must_use]
pub fn spawn_poller(feed: SharedFeed, period: Duration) -> PollHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = interval.tick() => {}
            }
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = poll_locked(&feed) => {}
            }
        }
        debug!("poller stopped");
    });
    PollHandle { stop: Some(stop_tx), task }
}

async fn poll_locked(feed: &SharedFeed) {
    let _ = feed.lock().await.poll().await;
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
