use crate::error::{MarketError, Result};
use crate::models::TokenPair;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Persistent home of the single access/refresh pair.
/// Access is synchronous; a new pair always replaces both tokens.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<TokenPair>>;

    fn save(&self, pair: &TokenPair) -> Result<()>;

    /// Remove both tokens
    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|pair| pair.access))
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|pair| pair.refresh))
    }
}

/// Stores the pair as a small JSON file
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> MarketError {
    MarketError::Storage(format!("{} {}: {}", action, path.display(), err))
}

/// Write `contents`, readable and writable by the owner only
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenPair>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &self.path, e)),
        };

        match serde_json::from_str::<TokenPair>(&raw) {
            Ok(pair) if !pair.access.is_empty() => Ok(Some(pair)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, pair: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error("create", parent, e))?;
        }
        let json = serde_json::to_string_pretty(pair)
            .map_err(|e| storage_error("encode", &self.path, e))?;
        write_private(&self.path, json.as_bytes())
            .map_err(|e| storage_error("write", &self.path, e))?;
        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cleared session at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

/// Process-local store, used when nothing should outlive the run
#[derive(Default)]
pub struct MemoryTokenStore {
    pair: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(access: &str, refresh: &str) -> Self {
        Self {
            pair: Mutex::new(Some(TokenPair {
                access: access.to_string(),
                refresh: refresh.to_string(),
            })),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenPair>> {
        let guard = self.pair.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, pair: &TokenPair) -> Result<()> {
        *self.pair.lock().unwrap_or_else(|e| e.into_inner()) = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.pair.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
