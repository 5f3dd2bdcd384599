//! Preview orchestrator.
//!
//! Runs one preview request through validation, rendering, composition and
//! display without blocking the caller.
//!
//! # Supersession
//!
//! Every request gets a sequence number when it is issued. When a render
//! completes, its result is delivered only if no newer request has been
//! issued since; otherwise it is dropped. The check and the sink call happen
//! under one lock, so an older document can never reach the sink after a
//! newer one. Superseded renders are not cancelled, only ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gfmv_credentials::CredentialProvider;
use gfmv_github::{MarkdownRenderer, RenderError, RenderedFragment};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sink::DisplaySink;
use crate::template::PreviewTemplate;

/// Pipeline stage of the most recent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Reading and checking credentials.
    Validating,
    /// Waiting for the rendering service.
    Rendering,
    /// Substituting the fragment into the template.
    Composing,
    /// Handing the document to the display sink.
    Displaying,
}

/// Runtime error surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// Identifier or secret is empty; no request was sent.
    #[error("GitHub identifier and secret are required before previewing")]
    MissingCredentials,

    /// The rendering service call failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What happened to one preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The composed document was handed to the display sink.
    Displayed {
        /// Request sequence number.
        seq: u64,
    },
    /// A newer request was issued before this one finished; its result was
    /// dropped.
    Superseded {
        /// Request sequence number.
        seq: u64,
    },
    /// The request failed and the error was reported to the sink.
    Failed {
        /// Request sequence number.
        seq: u64,
        /// Reported error.
        error: PreviewError,
    },
}

struct Inner {
    credentials: Arc<dyn CredentialProvider>,
    renderer: Arc<dyn MarkdownRenderer>,
    template: Arc<PreviewTemplate>,
    sink: Arc<dyn DisplaySink>,
    /// Sequence number of the most recently issued request.
    latest: AtomicU64,
    /// Serializes state updates and sink delivery.
    delivery: Mutex<()>,
    state: watch::Sender<PreviewState>,
}

/// Coordinates credentials, rendering, composition and display.
///
/// Cheap to clone; clones share the same request sequence.
#[derive(Clone)]
pub struct PreviewOrchestrator {
    inner: Arc<Inner>,
}

impl PreviewOrchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        renderer: Arc<dyn MarkdownRenderer>,
        template: Arc<PreviewTemplate>,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        let (state, _) = watch::channel(PreviewState::Idle);
        Self {
            inner: Arc::new(Inner {
                credentials,
                renderer,
                template,
                sink,
                latest: AtomicU64::new(0),
                delivery: Mutex::new(()),
                state,
            }),
        }
    }

    /// Preview `markdown` in the background.
    ///
    /// Supersedes any request still in flight. The returned handle resolves to
    /// the request's outcome; callers that only care about the sink may drop
    /// it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn preview_now(&self, markdown: impl Into<String>) -> JoinHandle<PreviewOutcome> {
        let seq = self.issue();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(inner.run(seq, markdown.into()))
    }

    /// Preview `markdown` and wait for the outcome.
    ///
    /// Same supersession rules as [`preview_now`](Self::preview_now).
    pub async fn preview(&self, markdown: impl Into<String>) -> PreviewOutcome {
        let seq = self.issue();
        Arc::clone(&self.inner).run(seq, markdown.into()).await
    }

    /// Current pipeline stage of the most recent request.
    #[must_use]
    pub fn state(&self) -> PreviewState {
        *self.inner.state.borrow()
    }

    /// Watch pipeline stage changes.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<PreviewState> {
        self.inner.state.subscribe()
    }

    /// Sequence number of the most recently issued request (0 before any).
    #[must_use]
    pub fn latest_seq(&self) -> u64 {
        self.inner.latest.load(Ordering::SeqCst)
    }

    fn issue(&self) -> u64 {
        self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Inner {
    async fn run(self: Arc<Self>, seq: u64, markdown: String) -> PreviewOutcome {
        self.transition(seq, PreviewState::Validating).await;
        let credentials = self.credentials.get();
        if !credentials.is_complete() {
            return self.deliver(seq, Err(PreviewError::MissingCredentials)).await;
        }

        self.transition(seq, PreviewState::Rendering).await;
        debug!(seq, bytes = markdown.len(), "Rendering preview");
        let renderer = Arc::clone(&self.renderer);
        let result = tokio::task::spawn_blocking(move || renderer.render(&markdown, &credentials))
            .await
            .unwrap_or_else(|e| {
                Err(RenderError::Unreachable(format!("render task failed: {e}")))
            });

        self.deliver(seq, result.map_err(PreviewError::from)).await
    }

    /// Compose and display, or report, unless `seq` has been superseded.
    ///
    /// Sinks may block, so they run on a blocking thread while the delivery
    /// lock is held.
    async fn deliver(
        self: &Arc<Self>,
        seq: u64,
        result: Result<RenderedFragment, PreviewError>,
    ) -> PreviewOutcome {
        let _guard = self.delivery.lock().await;
        if !self.is_latest(seq) {
            debug!(
                seq,
                latest = self.latest.load(Ordering::SeqCst),
                "Dropping superseded preview"
            );
            return PreviewOutcome::Superseded { seq };
        }

        let inner = Arc::clone(self);
        match tokio::task::spawn_blocking(move || inner.present(seq, result)).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            // Runtime shutting down.
            Err(_) => PreviewOutcome::Superseded { seq },
        }
    }

    /// Hand the result to the sink. Caller holds the delivery lock.
    fn present(
        &self,
        seq: u64,
        result: Result<RenderedFragment, PreviewError>,
    ) -> PreviewOutcome {
        let outcome = match result {
            Ok(fragment) => {
                self.set_state(PreviewState::Composing);
                let document = self.template.compose(&fragment);
                self.set_state(PreviewState::Displaying);
                self.sink.display(&document);
                info!(seq, bytes = document.as_str().len(), "Preview displayed");
                PreviewOutcome::Displayed { seq }
            }
            Err(error) => {
                warn!(seq, %error, "Preview failed");
                self.sink.report_error(&error);
                PreviewOutcome::Failed { seq, error }
            }
        };

        self.set_state(PreviewState::Idle);
        outcome
    }

    async fn transition(&self, seq: u64, state: PreviewState) {
        let _guard = self.delivery.lock().await;
        if self.is_latest(seq) {
            self.set_state(state);
        }
    }

    fn set_state(&self, state: PreviewState) {
        self.state.send_replace(state);
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gfmv_credentials::{Credentials, MemoryCredentials};

    use crate::template::ComposedDocument;

    struct EchoRenderer;

    impl MarkdownRenderer for EchoRenderer {
        fn render(
            &self,
            markdown: &str,
            _credentials: &Credentials,
        ) -> Result<RenderedFragment, RenderError> {
            Ok(RenderedFragment::new(format!("<p>{markdown}</p>")))
        }
    }

    #[derive(Default)]
    struct CountingSink {
        displayed: std::sync::Mutex<usize>,
    }

    impl DisplaySink for CountingSink {
        fn display(&self, _document: &ComposedDocument) {
            *self.displayed.lock().unwrap() += 1;
        }

        fn report_error(&self, _error: &PreviewError) {}
    }

    fn orchestrator(sink: Arc<CountingSink>) -> PreviewOrchestrator {
        PreviewOrchestrator::new(
            Arc::new(MemoryCredentials::new(Credentials::new("octocat", "token"))),
            Arc::new(EchoRenderer),
            Arc::new(PreviewTemplate::parse("{0}").unwrap()),
            sink,
        )
    }

    #[tokio::test]
    async fn test_sequence_numbers_increase() {
        let orchestrator = orchestrator(Arc::new(CountingSink::default()));
        assert_eq!(orchestrator.latest_seq(), 0);

        assert_eq!(
            orchestrator.preview("a").await,
            PreviewOutcome::Displayed { seq: 1 }
        );
        assert_eq!(
            orchestrator.preview("b").await,
            PreviewOutcome::Displayed { seq: 2 }
        );
        assert_eq!(orchestrator.latest_seq(), 2);
    }

    #[tokio::test]
    async fn test_returns_to_idle_after_display() {
        let sink = Arc::new(CountingSink::default());
        let orchestrator = orchestrator(Arc::clone(&sink));

        orchestrator.preview("a").await;

        assert_eq!(orchestrator.state(), PreviewState::Idle);
        assert_eq!(*sink.displayed.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_sequence() {
        let orchestrator = orchestrator(Arc::new(CountingSink::default()));
        let clone = orchestrator.clone();

        orchestrator.preview("a").await;
        clone.preview("b").await;

        assert_eq!(orchestrator.latest_seq(), 2);
    }

    #[derive(Default)]
    struct ThreadSink {
        thread: std::sync::Mutex<Option<std::thread::ThreadId>>,
    }

    impl DisplaySink for ThreadSink {
        fn display(&self, _document: &ComposedDocument) {
            *self.thread.lock().unwrap() = Some(std::thread::current().id());
        }

        fn report_error(&self, _error: &PreviewError) {}
    }

    #[tokio::test]
    async fn test_sink_runs_off_the_runtime_thread() {
        let sink = Arc::new(ThreadSink::default());
        let orchestrator = PreviewOrchestrator::new(
            Arc::new(MemoryCredentials::new(Credentials::new("octocat", "token"))),
            Arc::new(EchoRenderer),
            Arc::new(PreviewTemplate::parse("{0}").unwrap()),
            Arc::clone(&sink) as Arc<dyn DisplaySink>,
        );

        orchestrator.preview("a").await;

        let display_thread = sink.thread.lock().unwrap().unwrap();
        assert_ne!(display_thread, std::thread::current().id());
    }

    #[test]
    fn test_missing_credentials_message() {
        assert_eq!(
            PreviewError::MissingCredentials.to_string(),
            "GitHub identifier and secret are required before previewing"
        );
    }
}
