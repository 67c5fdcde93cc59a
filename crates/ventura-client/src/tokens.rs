//! Persistence for the access/refresh token pair

use crate::error::ClientResult;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::debug;
use ventura_core::TokenPair;

/// Storage for the session's credentials
///
/// The HTTP client consults the store before every request and writes the
/// refreshed pair back after a successful refresh.
pub trait TokenStore: Send + Sync + Debug {
    /// Load the stored pair, if any
    fn load(&self) -> ClientResult<Option<TokenPair>>;

    /// Replace the stored pair
    fn store(&self, tokens: &TokenPair) -> ClientResult<()>;

    /// Forget stored credentials
    fn clear(&self) -> ClientResult<()>;

    /// Current access token
    fn access_token(&self) -> ClientResult<Option<String>> {
        Ok(self.load()?.map(|tokens| tokens.access))
    }

    /// Current refresh token
    fn refresh_token(&self) -> ClientResult<Option<String>> {
        Ok(self.load()?.map(|tokens| tokens.refresh))
    }
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given pair
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<TokenPair>> {
        Ok(self.tokens.read().clone())
    }

    fn store(&self, tokens: &TokenPair) -> ClientResult<()> {
        *self.tokens.write() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.tokens.write() = None;
        Ok(())
    }
}

/// Token store persisted as a JSON file
///
/// Reads go through an in-memory copy; the file is only read once, on
/// first access.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<Option<TokenPair>>>,
}

impl FileTokenStore {
    /// Create a store backed by `path`; the file need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> ClientResult<Option<TokenPair>> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<TokenPair>> {
        if let Some(cached) = self.cached.read().as_ref() {
            return Ok(cached.clone());
        }

        let mut cached = self.cached.write();
        if let Some(tokens) = cached.as_ref() {
            return Ok(tokens.clone());
        }
        let tokens = self.read_file()?;
        *cached = Some(tokens.clone());
        Ok(tokens)
    }

    fn store(&self, tokens: &TokenPair) -> ClientResult<()> {
        let mut cached = self.cached.write();
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(tokens)?)?;
        *cached = Some(Some(tokens.clone()));
        debug!(path = %self.path.display(), "Stored session tokens");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut cached = self.cached.write();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        *cached = Some(None);
        debug!(path = %self.path.display(), "Cleared session tokens");
        Ok(())
    }
}
