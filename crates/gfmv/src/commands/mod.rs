//! CLI command implementations.

pub(crate) mod credentials;
mod pipeline;
pub(crate) mod preview;
pub(crate) mod watch;

pub(crate) use credentials::CredentialsCommand;
pub(crate) use preview::PreviewArgs;
pub(crate) use watch::WatchArgs;
