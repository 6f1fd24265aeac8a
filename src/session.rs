//! Session gate: login, signup, validation and logout.
//!
//! ARCHITECTURE
//! ============
//! `SessionGate` owns the two-state machine
//! `Unauthenticated -> Authenticated(credential) -> Unauthenticated`.
//! The initial state comes from `restore`, which always validates a stored
//! credential against the backend before admitting it (fail closed).
//!
//! ERROR HANDLING
//! ==============
//! Every failure is shown on the surface and also returned, so callers can
//! decide the exit code. `validate` never errors: anything but a 2xx is
//! `false`. A failed login or signup leaves the prior credential untouched.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ChatBackend;
use crate::error::ChatError;
use crate::store::CredentialStore;
use crate::surface::{Notice, Surface};
use crate::types::{AuthRequest, AuthResponse, Credential};

const MISSING_FIELDS: &str = "Username and password are required";
const NOT_LOGGED_IN: &str = "Session expired or not logged in.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Credential),
}

impl SessionState {
    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Authenticated(credential) => Some(credential),
            Self::Unauthenticated => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

pub struct SessionGate {
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn CredentialStore>,
    surface: Arc<dyn Surface>,
    state: SessionState,
}

impl SessionGate {
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>, store: Arc<dyn CredentialStore>, surface: Arc<dyn Surface>) -> Self {
        Self { backend, store, surface, state: SessionState::Unauthenticated }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Establish the initial state from the stored credential.
    ///
    /// Absent, unreadable, or rejected credentials all end in
    /// `Unauthenticated` with a login redirect; a rejected one is also cleared.
    pub async fn restore(&mut self) -> &SessionState {
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "credential load failed; treating as logged out");
                None
            }
        };

        let Some(credential) = stored else {
            self.enter_unauthenticated(NOT_LOGGED_IN);
            return &self.state;
        };

        if self.validate(&credential).await {
            info!(user = %credential.username, "stored session validated");
            self.state = SessionState::Authenticated(credential);
        } else {
            if let Err(e) = self.store.clear().await {
                warn!(error = %e, "failed to clear rejected credential");
            }
            self.enter_unauthenticated(NOT_LOGGED_IN);
        }
        &self.state
    }

    /// Log in and persist the returned token.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty field (no request sent), otherwise whatever the
    /// exchange or the credential store reported.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Credential, ChatError> {
        let username = require_fields(self.surface.as_ref(), username, password)?;
        let request = AuthRequest::Login { user: username.to_owned(), password: password.to_owned() };

        let response = self.exchange("Login", &request).await?;
        let Some(token) = response.token.filter(|t| !t.trim().is_empty()) else {
            let err = ChatError::Decode("login response carried no token".to_owned());
            self.surface.notify(&Notice::error(format!("Login failed: {err}")));
            return Err(err);
        };

        self.establish(Credential::new(username, token)).await
    }

    /// Create an account. When the backend answers without a token the gate
    /// logs in with the same credentials, so success always yields a session.
    ///
    /// # Errors
    ///
    /// Same as [`SessionGate::login`].
    pub async fn signup(&mut self, username: &str, password: &str) -> Result<Credential, ChatError> {
        let username = require_fields(self.surface.as_ref(), username, password)?;
        let request = AuthRequest::New { user: username.to_owned(), password: password.to_owned() };

        let response = self.exchange("Signup", &request).await?;
        if let Some(token) = response.token.filter(|t| !t.trim().is_empty()) {
            return self.establish(Credential::new(username, token)).await;
        }

        info!(user = %username, "account created; logging in");
        self.surface.notify(&Notice::info(
            response.success.unwrap_or_else(|| format!("Created new user {username}")),
        ));
        self.login(username, password).await
    }

    /// Ask the backend whether `credential` is still valid. Fails closed.
    pub async fn validate(&self, credential: &Credential) -> bool {
        if !credential.is_complete() {
            return false;
        }
        let request = AuthRequest::Check { user: credential.username.clone(), token: credential.token.clone() };
        match self.backend.authenticate(&request).await {
            Ok(_) => true,
            Err(e) => {
                warn!(user = %credential.username, code = e.code(), error = %e, "session validation failed");
                false
            }
        }
    }

    /// Forget the credential and return to the login step.
    ///
    /// # Errors
    ///
    /// `Storage` if the credential file could not be removed. The gate is
    /// `Unauthenticated` either way.
    pub async fn logout(&mut self) -> Result<(), ChatError> {
        let cleared = self.store.clear().await;
        if let Some(credential) = self.state.credential() {
            info!(user = %credential.username, "logged out");
        }
        self.state = SessionState::Unauthenticated;
        self.surface.redirect_to_login();

        if let Err(e) = &cleared {
            self.surface.notify(&Notice::error(format!("Logout could not clear the stored credential: {e}")));
        }
        cleared
    }

    async fn exchange(&self, action: &str, request: &AuthRequest) -> Result<AuthResponse, ChatError> {
        self.backend.authenticate(request).await.map_err(|e| {
            warn!(kind = request.kind(), code = e.code(), error = %e, "auth exchange failed");
            self.surface.notify(&Notice::error(user_text(action, &e)));
            e
        })
    }

    async fn establish(&mut self, credential: Credential) -> Result<Credential, ChatError> {
        if let Err(e) = self.store.save(&credential).await {
            self.surface.notify(&Notice::error(format!("Could not store credential: {e}")));
            return Err(e);
        }
        info!(user = %credential.username, "session established");
        self.state = SessionState::Authenticated(credential.clone());
        Ok(credential)
    }

    fn enter_unauthenticated(&mut self, reason: &str) {
        self.state = SessionState::Unauthenticated;
        self.surface.notify(&Notice::info(reason));
        self.surface.redirect_to_login();
    }
}

/// Reject empty fields before any request is made. Returns the trimmed username.
fn require_fields<'a>(surface: &dyn Surface, username: &'a str, password: &str) -> Result<&'a str, ChatError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        surface.notify(&Notice::error(MISSING_FIELDS));
        return Err(ChatError::Validation(MISSING_FIELDS.to_owned()));
    }
    Ok(username)
}

/// Server-provided text verbatim; transport problems get an action prefix.
pub(crate) fn user_text(action: &str, error: &ChatError) -> String {
    match error {
        ChatError::Auth(_) | ChatError::Server { .. } | ChatError::Validation(_) => error.to_string(),
        _ => format!("{action} failed: {error}"),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
