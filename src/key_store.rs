/*!
 * Persistent storage for the API key.
 *
 * The key lives alone in a plain text file. A stored key that does not
 * carry an accepted prefix is treated as absent.
 */

use anyhow::{anyhow, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::app_config::KeyConfig;
use crate::file_utils::FileManager;

/// File name used when no key path is configured
pub const DEFAULT_KEY_FILE: &str = "api_key.txt";

/// Whether `key` (after trimming) starts with one of `prefixes`
pub fn is_valid_key<S: AsRef<str>>(key: &str, prefixes: &[S]) -> bool {
    let key = key.trim();
    !key.is_empty() && prefixes.iter().any(|prefix| key.starts_with(prefix.as_ref()))
}

/// Loads and saves the API key at a fixed path
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
    accepted_prefixes: Vec<String>,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>, accepted_prefixes: Vec<String>) -> Self {
        Self {
            path: path.into(),
            accepted_prefixes,
        }
    }

    /// Build a store from configuration, falling back to [`KeyStore::default_path`]
    pub fn from_config(config: &KeyConfig) -> Self {
        let path = if config.key_file.trim().is_empty() {
            Self::default_path()
        } else {
            PathBuf::from(&config.key_file)
        };
        Self::new(path, config.accepted_prefixes.clone())
    }

    /// Per-user config directory when available, else the working directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("strans").join(DEFAULT_KEY_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_valid(&self, key: &str) -> bool {
        is_valid_key(key, &self.accepted_prefixes)
    }

    /// Read the stored key; `None` when missing or malformed
    pub fn load(&self) -> Result<Option<String>> {
        if !FileManager::file_exists(&self.path) {
            debug!("No API key file at {:?}", self.path);
            return Ok(None);
        }

        let key = FileManager::read_to_string(&self.path)?.trim().to_string();
        if self.is_valid(&key) {
            Ok(Some(key))
        } else {
            warn!("Ignoring malformed API key in {:?}", self.path);
            Ok(None)
        }
    }

    /// Validate and persist `key`, replacing any stored key
    pub fn save(&self, key: &str) -> Result<String> {
        let key = key.trim();
        if !self.is_valid(key) {
            let prefixes = self
                .accepted_prefixes
                .iter()
                .map(|prefix| format!("'{}'", prefix))
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(anyhow!("Key must start with {}", prefixes));
        }

        FileManager::write_to_file(&self.path, key)?;
        Ok(key.to_string())
    }
}
