//! `gfmv credentials` command implementation.

use clap::Subcommand;
use gfmv_credentials::{CredentialProvider, Credentials, SettingsStore};

use super::pipeline::ConfigArgs;
use crate::error::CliError;
use crate::output::Output;

/// Credential management commands.
#[derive(Subcommand)]
pub(crate) enum CredentialsCommand {
    /// Store a GitHub identifier and secret.
    Set {
        /// GitHub user name.
        #[arg(long)]
        identifier: String,

        /// Password or personal access token (keeps the stored one if omitted).
        ///
        /// Only this flag is persisted; `GFMV_SECRET` is a one-run override
        /// for `preview` and `watch`.
        #[arg(long)]
        secret: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show stored credentials with the secret masked.
    Show {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Remove stored credentials.
    Clear {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

impl CredentialsCommand {
    /// Execute the credentials command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the settings file cannot be
    /// read or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        match self {
            Self::Set {
                identifier,
                secret,
                config,
            } => {
                if identifier.is_empty() {
                    return Err(CliError::Validation("identifier must not be empty".into()));
                }
                let store = open_store(&config)?;
                let secret = secret.unwrap_or_else(|| store.get().secret);
                store.set(Credentials::new(identifier, secret));
                if store.flush()? {
                    output.success(&format!("Saved credentials to {}", store.path().display()));
                } else {
                    output.info("Credentials unchanged");
                }
                if !store.get().is_complete() {
                    output.warning("No secret stored; previews will fail until one is set");
                }
            }
            Self::Show { config } => {
                let store = open_store(&config)?;
                for line in describe(&store.get()) {
                    output.info(&line);
                }
                output.info(&format!("Stored in: {}", store.path().display()));
            }
            Self::Clear { config } => {
                let store = open_store(&config)?;
                store.set(Credentials::default());
                store.flush()?;
                output.success("Cleared stored credentials");
            }
        }

        Ok(())
    }
}

fn open_store(config: &ConfigArgs) -> Result<SettingsStore, CliError> {
    let config = config.load()?;
    Ok(SettingsStore::open(
        &config.settings_resolved.credentials_file,
    )?)
}

/// Human-readable lines describing `credentials`.
fn describe(credentials: &Credentials) -> Vec<String> {
    vec![
        format!("Identifier: {}", or_not_set(&credentials.identifier)),
        format!("Secret: {}", mask_secret(&credentials.secret)),
    ]
}

fn or_not_set(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

/// Mask a secret without revealing its length.
fn mask_secret(secret: &str) -> &'static str {
    if secret.is_empty() {
        "(not set)"
    } else {
        "********"
    }
}
