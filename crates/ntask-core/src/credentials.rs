//! Session token storage and retrieval.
//!
//! Stores the opaque session token in `${NTASK_HOME}/credentials.json` with
//! restricted permissions (0600). Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// On-disk credential shape.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CredentialCache {
    /// The session token issued by the server at login.
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Handle to the persistent token store.
///
/// The server alone decides token validity; there is no local expiry
/// tracking. `get` tolerates missing or unreadable storage by returning
/// `None` so callers can treat "no credential" and "no storage" alike.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store at the default credentials path.
    pub fn new() -> Self {
        Self {
            path: paths::credentials_path(),
        }
    }

    /// Creates a store at a specific file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored token, or `None` if there is none or the backing
    /// storage cannot be read.
    pub fn get(&self) -> Option<String> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %self.path.display(), error = %e, "credential store unreadable");
                }
                return None;
            }
        };

        match serde_json::from_str::<CredentialCache>(&contents) {
            Ok(cache) => cache.token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "credential store unparseable");
                None
            }
        }
    }

    /// Stores a token, replacing any previous one.
    pub fn set(&self, token: &str) -> Result<()> {
        self.save(&CredentialCache {
            token: Some(token.to_string()),
        })
    }

    /// Removes the stored token. Returns whether a token was present.
    pub fn clear(&self) -> Result<bool> {
        let had_token = self.get().is_some();
        if self.path.exists() {
            self.save(&CredentialCache::default())?;
        }
        Ok(had_token)
    }

    /// Saves the cache to disk with restricted permissions (0600).
    fn save(&self, cache: &CredentialCache) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(cache).context("Failed to serialize credentials")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    /// Test: get on a missing file is absent, not an error.
    #[test]
    fn test_get_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("credentials.json"));
        assert_eq!(store.get(), None);
    }

    /// Test: set then get round-trips the token.
    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("credentials.json"));

        store.set("tok-abcdef123456").unwrap();
        assert_eq!(store.get().as_deref(), Some("tok-abcdef123456"));
    }

    /// Test: clear removes the token and reports whether one existed.
    #[test]
    fn test_clear_reports_presence() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("credentials.json"));

        assert!(!store.clear().unwrap());

        store.set("tok-abcdef123456").unwrap();
        assert!(store.clear().unwrap());
        assert_eq!(store.get(), None);
    }

    /// Test: corrupt storage reads as absent.
    #[test]
    fn test_corrupt_file_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = TokenStore::at(&path);
        assert_eq!(store.get(), None);
    }

    /// Test: credentials file has restricted permissions on Unix.
    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = TokenStore::at(&path);
        store.set("tok-abcdef123456").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    /// Test: token masking.
    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("tok-abcdef1234567890"), "tok-abcd...");
        assert_eq!(mask_token("short"), "***");
    }
}
