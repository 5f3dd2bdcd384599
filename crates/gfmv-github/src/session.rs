//! Credential-keyed session cache.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use gfmv_credentials::Credentials;

/// Cache of one session, keyed by the credentials it was built with.
///
/// A session is only valid for its own credentials. Asking for a session with
/// any other credentials drops the cached one and builds a replacement.
pub struct SessionCache<S> {
    current: Mutex<Option<(Credentials, S)>>,
    builds: AtomicUsize,
}

impl<S: Clone> SessionCache<S> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    /// Return the session for `credentials`, building it if the cached session
    /// belongs to different credentials (or there is none yet).
    pub fn get_or_build(
        &self,
        credentials: &Credentials,
        build: impl FnOnce(&Credentials) -> S,
    ) -> S {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some((key, session)) = current.as_ref()
            && key == credentials
        {
            tracing::debug!(identifier = %credentials.identifier, "Reusing session");
            return session.clone();
        }

        let rebuilt = current.is_some();
        let session = build(credentials);
        *current = Some((credentials.clone(), session.clone()));
        self.builds.fetch_add(1, Ordering::Relaxed);
        tracing::info!(identifier = %credentials.identifier, rebuilt, "Built session");
        session
    }

    /// Drop the cached session.
    pub fn invalidate(&self) {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
    }

    /// Number of sessions built so far.
    #[must_use]
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl<S: Clone> Default for SessionCache<S> {
    fn default() -> Self {
        Self::new()
    }
}
