//! Preview document shell.
//!
//! The shell is an HTML document with exactly one [`CONTENT_MARKER`]. It is
//! checked once when loaded; composing afterwards cannot fail.

use std::fmt;
use std::path::{Path, PathBuf};

use gfmv_github::RenderedFragment;

/// Substitution point for the rendered fragment.
pub const CONTENT_MARKER: &str = "{0}";

/// Built-in shell used when no template file is configured.
const BUILTIN_TEMPLATE: &str = include_str!("../assets/preview.html");

/// Error loading or parsing a preview template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template file does not exist.
    #[error("preview template not found: {}", .0.display())]
    Missing(PathBuf),

    /// Template file could not be read.
    #[error("failed to read preview template {}: {source}", path.display())]
    Io {
        /// Template file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Template has no substitution point.
    #[error("preview template has no {{0}} content marker")]
    MissingMarker,

    /// Template has more than one substitution point.
    #[error("preview template has {0} content markers, expected exactly one")]
    DuplicateMarker(usize),
}

/// HTML shell with one substitution point for a rendered fragment.
///
/// Immutable once parsed. Share it with `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTemplate {
    head: String,
    tail: String,
}

impl PreviewTemplate {
    /// Parse a template from its source text.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingMarker`] or
    /// [`TemplateError::DuplicateMarker`] unless the source contains the
    /// marker exactly once.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let count = source.matches(CONTENT_MARKER).count();
        match count {
            0 => Err(TemplateError::MissingMarker),
            1 => {
                let (head, tail) = source
                    .split_once(CONTENT_MARKER)
                    .ok_or(TemplateError::MissingMarker)?;
                Ok(Self {
                    head: head.to_owned(),
                    tail: tail.to_owned(),
                })
            }
            n => Err(TemplateError::DuplicateMarker(n)),
        }
    }

    /// Load and parse a template file.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Missing`] if the file does not exist,
    /// [`TemplateError::Io`] if it cannot be read, or a marker error.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::Missing(path.to_path_buf())
            } else {
                TemplateError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let template = Self::parse(&source)?;
        tracing::debug!(path = %path.display(), "Loaded preview template");
        Ok(template)
    }

    /// Load `path` if given, otherwise use the built-in shell.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) when a path is given.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, TemplateError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    /// The built-in shell.
    #[must_use]
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_TEMPLATE)
            .expect("built-in preview template has one content marker")
    }

    /// Substitute `fragment` into the shell.
    #[must_use]
    pub fn compose(&self, fragment: &RenderedFragment) -> ComposedDocument {
        let html = fragment.as_str();
        let mut document = String::with_capacity(self.head.len() + html.len() + self.tail.len());
        document.push_str(&self.head);
        document.push_str(html);
        document.push_str(&self.tail);
        ComposedDocument(document)
    }
}

/// Shell with its substitution point filled. Handed to the display sink and
/// not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDocument(String);

impl ComposedDocument {
    /// Document HTML.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the document, returning its HTML.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ComposedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
