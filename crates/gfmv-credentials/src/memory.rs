//! In-memory credential provider.

use std::sync::RwLock;

use crate::{CredentialProvider, Credentials};

/// Credential provider that keeps the pair in memory only.
///
/// Used for tests and for per-run overrides that must not be persisted.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    credentials: RwLock<Credentials>,
}

impl MemoryCredentials {
    /// Create a provider holding the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }
}

impl CredentialProvider for MemoryCredentials {
    fn get(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = credentials;
    }
}
