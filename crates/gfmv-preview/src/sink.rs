//! Display sink contract.

use crate::orchestrator::PreviewError;
use crate::template::ComposedDocument;

/// Host-provided viewport receiving preview results.
///
/// Both methods run on a blocking thread while the orchestrator's delivery
/// lock is held, one call at a time and never for a superseded request. They
/// may do blocking I/O; the next delivery waits for them.
pub trait DisplaySink: Send + Sync {
    /// Show a composed document.
    fn display(&self, document: &ComposedDocument);

    /// Show a user-visible error. Called once per failed request.
    fn report_error(&self, error: &PreviewError);
}
