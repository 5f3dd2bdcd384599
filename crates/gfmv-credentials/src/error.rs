//! Error types for the settings store.

use std::path::PathBuf;

/// Error reading or writing persisted credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// Settings file could not be read or written.
    #[error("settings file {}: {source}", path.display())]
    Io {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not a valid credentials record.
    #[error("invalid settings file {}: {source}", path.display())]
    Parse {
        /// Settings file path.
        path: PathBuf,
        /// TOML parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Credentials could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
