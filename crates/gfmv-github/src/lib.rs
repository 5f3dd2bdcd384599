//! GitHub markdown rendering client for gfmv.
//!
//! Sends raw markdown to GitHub's `POST /markdown/raw` endpoint and returns the
//! HTML fragment GitHub produces. GitHub is the authority on GFM semantics;
//! nothing is rendered locally.
//!
//! # Sessions
//!
//! [`GithubClient`] keeps one authenticated session (HTTP agent plus
//! authorization header) in a [`SessionCache`] keyed by [`Credentials`].
//! A render with different credentials than the cached session rebuilds it, so
//! correcting bad credentials takes effect on the next render.
//!
//! # Example
//!
//! ```ignore
//! use gfmv_credentials::Credentials;
//! use gfmv_github::{GithubClient, MarkdownRenderer};
//!
//! let client = GithubClient::new("https://api.github.com", "gfmv", Duration::from_secs(30));
//! let fragment = client.render("# Hi", &Credentials::new("octocat", "ghp_token"))?;
//! ```

mod client;
mod error;
mod session;

use std::fmt;

use gfmv_credentials::Credentials;

pub use client::GithubClient;
pub use error::RenderError;
pub use session::SessionCache;

/// HTML fragment returned by the rendering service.
///
/// Opaque body content without a surrounding document shell.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RenderedFragment(String);

impl RenderedFragment {
    /// Wrap rendered HTML.
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Fragment HTML.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the fragment, returning its HTML.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for RenderedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderedFragment")
            .field(&self.0.len())
            .finish()
    }
}

impl From<String> for RenderedFragment {
    fn from(html: String) -> Self {
        Self(html)
    }
}

/// Renders raw markdown into an HTML fragment.
///
/// One call is one remote request. Implementations block until the request
/// completes; async callers run them on a blocking thread. No retries.
pub trait MarkdownRenderer: Send + Sync {
    /// Render `markdown` under `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the service rejects the credentials or the
    /// body, or cannot be reached.
    fn render(
        &self,
        markdown: &str,
        credentials: &Credentials,
    ) -> Result<RenderedFragment, RenderError>;
}
