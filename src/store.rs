//! Credential persistence.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gate reads the stored credential at start and on every send, writes
//! it after login/signup, and clears it on logout or failed validation. One
//! mechanism only: a JSON file `{"username": ..., "token": ...}`.
//!
//! ERROR HANDLING
//! ==============
//! A missing file, unparseable JSON, or a credential with an empty half all
//! load as `None`. Only real I/O failures surface as `ChatError::Storage`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::ChatError;
use crate::types::Credential;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if a complete one exists.
    async fn load(&self) -> Result<Option<Credential>, ChatError>;

    /// Replace the stored credential.
    async fn save(&self, credential: &Credential) -> Result<(), ChatError>;

    /// Remove the stored credential. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), ChatError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, ChatError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Credential>(&raw) {
            Ok(credential) if credential.is_complete() => Ok(Some(credential)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "ignoring unreadable credential file");
                Ok(None)
            }
        }
    }

    async fn save(&self, credential: &Credential) -> Result<(), ChatError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_vec_pretty(credential).map_err(|e| ChatError::Storage(e.to_string()))?;

        // Write beside the target and rename so a crash never leaves half a token.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        restrict_permissions(&tmp).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ChatError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), ChatError> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), ChatError> {
    Ok(())
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Used by tests and by callers that never persist.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self { inner: Mutex::new(Some(credential)) }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, ChatError> {
        Ok(self.inner.lock().await.clone().filter(Credential::is_complete))
    }

    async fn save(&self, credential: &Credential) -> Result<(), ChatError> {
        *self.inner.lock().await = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ChatError> {
        *self.inner.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
