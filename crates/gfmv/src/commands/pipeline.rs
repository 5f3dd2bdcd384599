//! Shared setup for commands that render previews.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use gfmv_config::{CliSettings, Config};
use gfmv_credentials::{CredentialProvider, Credentials, MemoryCredentials, SettingsStore};
use gfmv_github::{GithubClient, MarkdownRenderer};
use gfmv_preview::{DisplaySink, PreviewOrchestrator, PreviewTemplate};

use crate::error::CliError;
use crate::sink::{DocumentSink, Target};

/// Configuration arguments shared by all commands.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover gfmv.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub API base URL (overrides config).
    #[arg(long)]
    api_url: Option<String>,

    /// Render request timeout in seconds (overrides config).
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Preview shell template containing one `{0}` marker (overrides config).
    #[arg(long)]
    template: Option<PathBuf>,

    /// Credentials settings file (overrides config).
    #[arg(long)]
    credentials_file: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load configuration with CLI overrides applied.
    pub(crate) fn load(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs,
            template: self.template.clone(),
            credentials_file: self.credentials_file.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// One-run credential overrides. Never persisted.
#[derive(Args)]
pub(crate) struct CredentialOverrides {
    /// GitHub identifier for this run (overrides stored value).
    #[arg(long, env = "GFMV_IDENTIFIER", hide_env_values = true)]
    identifier: Option<String>,

    /// GitHub secret for this run (overrides stored value).
    #[arg(long, env = "GFMV_SECRET", hide_env_values = true)]
    secret: Option<String>,
}

impl CredentialOverrides {
    /// Stored credentials with overrides applied, or `None` without overrides.
    fn apply(&self, stored: Credentials) -> Option<Credentials> {
        if self.identifier.is_none() && self.secret.is_none() {
            return None;
        }
        Some(Credentials {
            identifier: self.identifier.clone().unwrap_or(stored.identifier),
            secret: self.secret.clone().unwrap_or(stored.secret),
        })
    }
}

/// Wired-up preview pipeline.
pub(crate) struct Pipeline {
    pub(crate) orchestrator: PreviewOrchestrator,
    pub(crate) sink: Arc<DocumentSink>,
    pub(crate) store: Arc<SettingsStore>,
}

impl Pipeline {
    /// Build the pipeline from configuration.
    pub(crate) fn build(
        config: &Config,
        overrides: &CredentialOverrides,
        target: Target,
        report_errors: bool,
    ) -> Result<Self, CliError> {
        let store = Arc::new(SettingsStore::open(
            &config.settings_resolved.credentials_file,
        )?);
        let credentials: Arc<dyn CredentialProvider> = match overrides.apply(store.get()) {
            Some(credentials) => {
                tracing::debug!("Using credential overrides for this run");
                Arc::new(MemoryCredentials::new(credentials))
            }
            None => Arc::clone(&store) as Arc<dyn CredentialProvider>,
        };

        let template = PreviewTemplate::load_or_builtin(
            config.preview_resolved.template.as_deref(),
        )?;
        let renderer: Arc<dyn MarkdownRenderer> =
            Arc::new(GithubClient::from_config(&config.github));
        let sink = Arc::new(DocumentSink::new(target, report_errors));

        Ok(Self {
            orchestrator: PreviewOrchestrator::new(
                credentials,
                renderer,
                Arc::new(template),
                Arc::clone(&sink) as Arc<dyn DisplaySink>,
            ),
            sink,
            store,
        })
    }

    /// Persist pending settings changes.
    pub(crate) fn shutdown(&self) -> Result<(), CliError> {
        self.store.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn overrides(identifier: Option<&str>, secret: Option<&str>) -> CredentialOverrides {
        CredentialOverrides {
            identifier: identifier.map(str::to_owned),
            secret: secret.map(str::to_owned),
        }
    }

    #[test]
    fn no_overrides_uses_store() {
        let stored = Credentials::new("octocat", "token");
        assert_eq!(overrides(None, None).apply(stored), None);
    }

    #[test]
    fn partial_override_keeps_stored_field() {
        let stored = Credentials::new("octocat", "token");
        assert_eq!(
            overrides(None, Some("fresh")).apply(stored),
            Some(Credentials::new("octocat", "fresh"))
        );
    }

    #[test]
    fn full_override_replaces_both() {
        assert_eq!(
            overrides(Some("hubot"), Some("x")).apply(Credentials::default()),
            Some(Credentials::new("hubot", "x"))
        );
    }

    #[test]
    fn build_with_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.settings_resolved.credentials_file = dir.path().join("credentials.toml");
        config.preview_resolved.template = Some(dir.path().join("missing.html"));

        let result = Pipeline::build(&config, &overrides(None, None), Target::Stdout, false);

        assert!(matches!(result, Err(CliError::Template(_))));
    }

    #[test]
    fn shutdown_without_changes_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        let mut config = Config::default();
        config.settings_resolved.credentials_file.clone_from(&path);

        let pipeline =
            Pipeline::build(&config, &overrides(None, None), Target::Stdout, false).unwrap();
        pipeline.shutdown().unwrap();

        assert!(!path.exists());
    }
}
