//! # Token Storage
//!
//! Persisted storage for the two session token strings.
//!
//! The only local state the POS client persists is the access/refresh token
//! pair; everything else is backend-owned or ephemeral. The store is a
//! trait so the session manager can be tested without touching the
//! filesystem.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// The persisted access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Persisted token storage.
///
/// Implementations must be cheap to call; the session manager reads on
/// restore and writes on every login/refresh.
pub trait TokenStore: Send + Sync {
    /// Loads the stored pair, `None` when nothing is persisted.
    fn load(&self) -> ApiResult<Option<TokenPair>>;

    /// Persists the pair, replacing any previous one.
    fn save(&self, tokens: &TokenPair) -> ApiResult<()>;

    /// Removes any persisted tokens. Must succeed when nothing is stored.
    fn clear(&self) -> ApiResult<()>;
}

// =============================================================================
// File-Backed Store
// =============================================================================

/// Token store backed by a JSON file under the platform config directory
/// (`~/.config/keylimar-pos/session.json` on Linux).
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store at the platform-default location.
    pub fn new() -> ApiResult<Self> {
        let dirs = directories::ProjectDirs::from("com", "keylimar", "keylimar-pos")
            .ok_or_else(|| ApiError::Storage("no home directory available".to_string()))?;
        Ok(Self::with_path(dirs.config_dir().join("session.json")))
    }

    /// Creates a store at an explicit path (tests, portable installs).
    pub fn with_path(path: PathBuf) -> Self {
        FileTokenStore { path }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ApiResult<Option<TokenPair>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, tokens: &TokenPair) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(tokens)?)?;
        debug!(path = %self.path.display(), "tokens persisted");
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-memory token store for tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ApiResult<Option<TokenPair>> {
        Ok(self.inner.lock().expect("token store poisoned").clone())
    }

    fn save(&self, tokens: &TokenPair) -> ApiResult<()> {
        *self.inner.lock().expect("token store poisoned") = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        *self.inner.lock().expect("token store poisoned") = None;
        Ok(())
    }
}
