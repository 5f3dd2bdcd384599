//! File-backed settings store.
//!
//! Holds the identifier/secret pair in memory and writes it to a TOML file
//! only when [`SettingsStore::flush`] is called, normally once at shutdown.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::error::CredentialsError;
use crate::{CredentialProvider, Credentials};

struct State {
    credentials: Credentials,
    dirty: bool,
}

/// Credential provider persisted to a TOML settings file.
///
/// `set` only updates memory and marks the store dirty. Nothing touches the
/// disk until [`flush`](Self::flush).
pub struct SettingsStore {
    path: PathBuf,
    state: RwLock<State>,
}

impl SettingsStore {
    /// Open the settings file at `path`.
    ///
    /// A missing file is not an error: the store starts with empty
    /// credentials and creates the file on the first flush.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Io`] if the file exists but cannot be read,
    /// or [`CredentialsError::Parse`] if it is not a valid record.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialsError> {
        let path = path.into();

        let credentials = match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|source| CredentialsError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, starting empty");
                Credentials::default()
            }
            Err(source) => return Err(CredentialsError::Io { path, source }),
        };

        Ok(Self {
            path,
            state: RwLock::new(State {
                credentials,
                dirty: false,
            }),
        })
    }

    /// Settings file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet written to disk.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.read_state().dirty
    }

    /// Write pending changes to the settings file.
    ///
    /// Returns `true` if the file was written, `false` if there was nothing to
    /// write. Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails. The store stays
    /// dirty in that case, so a later flush retries.
    pub fn flush(&self) -> Result<bool, CredentialsError> {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !state.dirty {
            return Ok(false);
        }

        let content = toml::to_string(&state.credentials)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CredentialsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, content).map_err(|source| CredentialsError::Io {
            path: self.path.clone(),
            source,
        })?;

        state.dirty = false;
        info!(path = %self.path.display(), "Settings saved");
        Ok(true)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialProvider for SettingsStore {
    fn get(&self) -> Credentials {
        self.read_state().credentials.clone()
    }

    fn set(&self, credentials: Credentials) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if state.credentials != credentials {
            state.credentials = credentials;
            state.dirty = true;
        }
    }
}
