//! Display sinks writing composed documents to a file or stdout.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use gfmv_preview::{ComposedDocument, DisplaySink, PreviewError};

use crate::output::Output;

/// Where composed documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Stdout,
    File(PathBuf),
}

impl From<Option<PathBuf>> for Target {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stdout, Self::File)
    }
}

/// Sink used by the CLI commands.
///
/// Errors are printed to the terminal only when `report_errors` is set; the
/// one-shot command reports the outcome itself. The last failed write is kept
/// for [`take_write_error`](Self::take_write_error) either way.
pub(crate) struct DocumentSink {
    target: Target,
    report_errors: bool,
    write_error: Mutex<Option<std::io::Error>>,
    output: Output,
}

impl DocumentSink {
    pub(crate) fn new(target: Target, report_errors: bool) -> Self {
        Self {
            target,
            report_errors,
            write_error: Mutex::new(None),
            output: Output::new(),
        }
    }

    /// The last write failure, if any, clearing it.
    pub(crate) fn take_write_error(&self) -> Option<std::io::Error> {
        self.write_error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }

    fn write(&self, html: &str) -> std::io::Result<()> {
        match &self.target {
            Target::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()
            }
            Target::File(path) => std::fs::write(path, html),
        }
    }
}

impl DisplaySink for DocumentSink {
    fn display(&self, document: &ComposedDocument) {
        if let Err(e) = self.write(document.as_str()) {
            tracing::warn!(error = %e, "Failed to write preview");
            if self.report_errors {
                self.output
                    .error(&format!("Error: failed to write preview: {e}"));
            }
            *self
                .write_error
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(e);
            return;
        }
        if let Target::File(path) = &self.target {
            tracing::info!(path = %path.display(), "Wrote preview");
        }
    }

    fn report_error(&self, error: &PreviewError) {
        if self.report_errors {
            self.output.error(&format!("Error: {error}"));
        }
    }
}
