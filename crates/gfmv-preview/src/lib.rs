//! Preview pipeline for gfmv.
//!
//! Turns a markdown snapshot into a displayable HTML document using GitHub's
//! renderer, without blocking the editing surface.
//!
//! # Architecture
//!
//! ```text
//! content source ──markdown──► PreviewOrchestrator
//!                                  │
//!                                  ├─► CredentialProvider (read)
//!                                  ├─► MarkdownRenderer (blocking thread)
//!                                  ├─► PreviewTemplate::compose
//!                                  └─► DisplaySink (display / report_error)
//! ```
//!
//! The orchestrator guarantees latest-wins delivery: a result is shown only if
//! no newer request was issued while it was in flight.

pub mod content;
mod orchestrator;
mod sink;
mod template;

pub use orchestrator::{PreviewError, PreviewOrchestrator, PreviewOutcome, PreviewState};
pub use sink::DisplaySink;
pub use template::{CONTENT_MARKER, ComposedDocument, PreviewTemplate, TemplateError};
