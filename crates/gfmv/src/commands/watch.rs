//! `gfmv watch` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use gfmv_preview::{PreviewOrchestrator, content};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::pipeline::{ConfigArgs, CredentialOverrides, Pipeline};
use crate::error::CliError;
use crate::output::Output;
use crate::sink::Target;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Markdown file to watch.
    file: PathBuf,

    /// HTML file rewritten with every displayed preview.
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    credentials: CredentialOverrides,
}

impl WatchArgs {
    /// Execute the watch command.
    ///
    /// Renders once, then again on every change to the file until Ctrl-C.
    /// Each change supersedes the render still in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file does not exist, or
    /// the watcher cannot be started.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;

        let file = std::fs::canonicalize(&self.file)?;
        let dir = file
            .parent()
            .ok_or_else(|| CliError::Validation(format!("{} has no parent", file.display())))?
            .to_path_buf();

        let pipeline = Pipeline::build(
            &config,
            &self.credentials,
            Target::File(self.output.clone()),
            true,
        )?;

        // Watch the directory: editors often save by replacing the file.
        let (tx, mut rx) = mpsc::channel::<Event>(100);
        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    // Use blocking_send since callback is sync
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        output.info(&format!(
            "Watching {}, writing preview to {}",
            file.display(),
            self.output.display()
        ));
        output.info("Press Ctrl-C to stop.");

        refresh(&pipeline.orchestrator, &file, &output).await;

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                result = &mut shutdown => {
                    result?;
                    break;
                }
                Some(event) = rx.recv() => {
                    if touches(&event, &file) {
                        tracing::debug!(kind = ?event.kind, "Markdown file changed");
                        refresh(&pipeline.orchestrator, &file, &output).await;
                    }
                }
            }
        }

        drop(watcher);
        pipeline.shutdown()?;
        output.success("Stopped watching");
        Ok(())
    }
}

/// Read the file and issue a preview without waiting for it.
async fn refresh(orchestrator: &PreviewOrchestrator, file: &Path, output: &Output) {
    match content::load_markdown(file).await {
        Ok(markdown) => {
            orchestrator.preview_now(markdown);
        }
        Err(e) => output.warning(&format!("Could not read {}: {e}", file.display())),
    }
}

/// Whether `event` changed the contents at `target`.
fn touches(event: &Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|path| path == target)
}
