//! CLI error types.

use gfmv_config::ConfigError;
use gfmv_credentials::CredentialsError;
use gfmv_preview::{PreviewError, TemplateError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Credentials(#[from] CredentialsError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("File watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0}")]
    Preview(#[from] PreviewError),

    #[error("{0}")]
    Validation(String),
}
