// Awskeyring — Configuration
//
// Settings are read from a JSON file. Every field has a default, so a missing
// file or a partial file is fine.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::enclave::{KeyringProvider, DEFAULT_KEYRING_SERVICE};
use crate::error::{AwskeyringError, Result};
use crate::rotation::DEFAULT_KEY_QUOTA;
use crate::store::{Database, SecretStore};
use crate::validate;

const DATA_DIR_NAME: &str = "awskeyring";
const DATABASE_FILE: &str = "awskeyring.db";

/// Default directory for awskeyring data files.
pub fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(DATA_DIR_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OS keyring service holding the database master secret.
    pub keyring_service: String,
    pub database_path: PathBuf,
    /// Access keys the remote service allows per identity.
    pub key_quota: usize,
    pub session_duration_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keyring_service: DEFAULT_KEYRING_SERVICE.to_string(),
            database_path: data_dir().join(DATABASE_FILE),
            key_quota: DEFAULT_KEY_QUOTA,
            session_duration_secs: 3600,
        }
    }
}

impl Config {
    /// Read the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = serde_json::from_str(&raw)?;
        config.check()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.keyring_service.trim().is_empty() {
            return Err(AwskeyringError::Config("keyring_service must not be empty".to_string()));
        }
        if self.key_quota == 0 {
            return Err(AwskeyringError::Config("key_quota must be at least 1".to_string()));
        }
        validate::validate_session_duration(self.session_duration_secs)?;
        Ok(())
    }

    pub fn session_duration(&self) -> Duration {
        Duration::seconds(self.session_duration_secs)
    }

    /// Unlock the encrypted credential database, creating it and the keyring
    /// master secret on first use.
    pub fn open_store(&self) -> Result<SecretStore<Database>> {
        if let Some(dir) = self.database_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let provider = KeyringProvider::new(self.keyring_service.as_str());
        let db = Database::unlock(&self.database_path, &provider)?;
        Ok(SecretStore::new(db))
    }
}
