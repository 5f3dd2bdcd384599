//! `${VAR}` expansion for configuration values.
//!
//! `${VAR:-default}` falls back to `default` when `VAR` is unset or empty.
//! Bare `$VAR` is left alone. Path values additionally expand a leading `~`.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::ConfigError;

/// Lookup failure; shellexpand records the variable name.
struct Unset;

/// Expand `${VAR}` references against the process environment.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    expand_with(value, field, |name| std::env::var(name).ok())
}

/// Expand `${VAR}` references, then a leading `~`.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<PathBuf, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(PathBuf::from(shellexpand::tilde(&expanded).into_owned()))
}

fn expand_with(
    value: &str,
    field: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    // shellexpand also expands bare `$VAR`; only braced references are ours.
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| lookup(name).map(Some).ok_or(Unset))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}
