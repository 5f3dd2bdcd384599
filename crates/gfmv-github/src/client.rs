//! GitHub REST API client for the markdown endpoint.
//!
//! Provides a sync HTTP client for `POST /markdown/raw` with HTTP Basic
//! authentication built from the identifier/secret pair.

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use gfmv_config::GithubConfig;
use gfmv_credentials::Credentials;
use tracing::{debug, warn};
use ureq::Agent;

use crate::error::RenderError;
use crate::session::SessionCache;
use crate::{MarkdownRenderer, RenderedFragment};

/// Default HTTP timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated connection state bound to one credentials value.
#[derive(Clone)]
struct Session {
    agent: Agent,
    authorization: String,
}

impl Session {
    fn new(credentials: &Credentials, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let token = BASE64_STANDARD.encode(format!(
            "{}:{}",
            credentials.identifier, credentials.secret
        ));

        Self {
            agent,
            authorization: format!("Basic {token}"),
        }
    }
}

/// GitHub markdown rendering client.
pub struct GithubClient {
    endpoint: String,
    user_agent: String,
    timeout: Duration,
    sessions: SessionCache<Session>,
}

impl GithubClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `api_url` - API root (e.g. `https://api.github.com`)
    /// * `user_agent` - `User-Agent` header value
    /// * `timeout` - Global timeout for each render request
    #[must_use]
    pub fn new(api_url: &str, user_agent: &str, timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/markdown/raw", api_url.trim_end_matches('/')),
            user_agent: user_agent.to_owned(),
            timeout,
            sessions: SessionCache::new(),
        }
    }

    /// Create client from config values.
    #[must_use]
    pub fn from_config(config: &GithubConfig) -> Self {
        Self::new(&config.api_url, &config.user_agent, config.timeout())
    }

    /// Render endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of sessions built since the client was created.
    #[must_use]
    pub fn sessions_built(&self) -> usize {
        self.sessions.builds()
    }

    fn session(&self, credentials: &Credentials) -> Session {
        let timeout = self.timeout;
        self.sessions
            .get_or_build(credentials, |credentials| Session::new(credentials, timeout))
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new("https://api.github.com", "gfmv", DEFAULT_TIMEOUT)
    }
}

impl MarkdownRenderer for GithubClient {
    fn render(
        &self,
        markdown: &str,
        credentials: &Credentials,
    ) -> Result<RenderedFragment, RenderError> {
        let session = self.session(credentials);

        debug!(bytes = markdown.len(), url = %self.endpoint, "Sending render request");
        let response = session
            .agent
            .post(&self.endpoint)
            .header("Authorization", &session.authorization)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "text/html")
            .header("Content-Type", "text/plain; charset=utf-8")
            .send(markdown.as_bytes())?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if !(200..300).contains(&status) {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            let err = RenderError::from_status(status, &error_body);
            warn!(status, error = %err, "Render request failed");
            if matches!(err, RenderError::InvalidCredentials { .. }) {
                self.sessions.invalidate();
            }
            return Err(err);
        }

        let html = body.read_to_string()?;
        debug!(status, bytes = html.len(), "Render request succeeded");
        Ok(RenderedFragment::new(html))
    }
}
