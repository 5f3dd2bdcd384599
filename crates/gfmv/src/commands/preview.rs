//! `gfmv preview` command implementation.

use std::path::PathBuf;

use clap::Args;
use gfmv_preview::{PreviewOutcome, content};

use super::pipeline::{ConfigArgs, CredentialOverrides, Pipeline};
use crate::error::CliError;
use crate::output::Output;
use crate::sink::{DocumentSink, Target};

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Write the HTML document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    credentials: CredentialOverrides,
}

impl PreviewArgs {
    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading the file, or rendering fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;

        if !content::is_markdown_path(&self.file) {
            output.warning(&format!(
                "{} does not look like a markdown file",
                self.file.display()
            ));
        }
        let markdown = content::load_markdown(&self.file).await?;

        let written_to = self.output.clone();
        let pipeline = Pipeline::build(&config, &self.credentials, Target::from(self.output), false)?;
        let outcome = pipeline.orchestrator.preview(markdown).await;
        pipeline.shutdown()?;

        finish(outcome, &pipeline.sink)?;
        if let Some(path) = written_to {
            output.success(&format!("Preview written to {}", path.display()));
        }
        Ok(())
    }
}

/// Command result for a one-shot outcome, including a failed write.
fn finish(outcome: PreviewOutcome, sink: &DocumentSink) -> Result<(), CliError> {
    match outcome {
        PreviewOutcome::Displayed { .. } => match sink.take_write_error() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        },
        PreviewOutcome::Failed { error, .. } => Err(error.into()),
        PreviewOutcome::Superseded { .. } => Ok(()),
    }
}
