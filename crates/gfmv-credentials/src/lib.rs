//! Credential provider for gfmv.
//!
//! Supplies the identifier/secret pair used to authenticate render requests.
//! This crate only stores credentials; it never validates them against the
//! remote service.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Credentials`], the identifier/secret pair
//! - [`CredentialProvider`] trait with `get()` and `set()`
//! - [`SettingsStore`], a file-backed provider flushed at shutdown
//! - [`MemoryCredentials`], an in-memory provider
//!
//! # Example
//!
//! ```ignore
//! use gfmv_credentials::{CredentialProvider, Credentials, SettingsStore};
//!
//! let store = SettingsStore::open("credentials.toml")?;
//! store.set(Credentials::new("octocat", "ghp_token"));
//! // ... application runs ...
//! store.flush()?;
//! ```

mod error;
mod memory;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::CredentialsError;
pub use memory::MemoryCredentials;
pub use store::SettingsStore;

/// Identifier/secret pair used to authenticate render requests.
///
/// Both fields must be non-empty before a render is attempted, see
/// [`Credentials::is_complete`].
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Account or application identifier.
    pub identifier: String,
    /// Secret paired with the identifier (password or token).
    pub secret: String,
}

impl Credentials {
    /// Create credentials from an identifier and secret.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Whether both the identifier and the secret are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.identifier.is_empty() && !self.secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &secret)
            .finish()
    }
}

/// Source of the current credentials.
///
/// Implementations are pure storage: `set` never validates format or
/// reachability, and `get` returns whatever was stored last (possibly empty).
pub trait CredentialProvider: Send + Sync {
    /// Current credentials snapshot.
    fn get(&self) -> Credentials;

    /// Replace the stored credentials.
    fn set(&self, credentials: Credentials);
}
