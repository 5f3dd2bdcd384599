//! Configuration management for gfmv.
//!
//! Parses `gfmv.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `github.api_url`
//! - `github.user_agent`
//! - `preview.template`
//! - `settings.credentials_file` (also expands a leading `~`)

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override GitHub API base URL.
    pub api_url: Option<String>,
    /// Override render request timeout.
    pub timeout_secs: Option<u64>,
    /// Override preview template path.
    pub template: Option<PathBuf>,
    /// Override credentials settings file.
    pub credentials_file: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "gfmv.toml";

/// Default location of the persisted credentials record.
const DEFAULT_CREDENTIALS_FILE: &str = "~/.config/gfmv/credentials.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub rendering service configuration.
    pub github: GithubConfig,
    /// Preview configuration (paths are relative strings from TOML).
    preview: PreviewConfigRaw,
    /// Settings store configuration (paths are relative strings from TOML).
    settings: SettingsConfigRaw,

    /// Resolved preview configuration (set after loading).
    #[serde(skip)]
    pub preview_resolved: PreviewConfig,
    /// Resolved settings configuration (set after loading).
    #[serde(skip)]
    pub settings_resolved: SettingsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github: GithubConfig::default(),
            preview: PreviewConfigRaw::default(),
            settings: SettingsConfigRaw::default(),
            preview_resolved: PreviewConfig::default(),
            settings_resolved: SettingsConfig::default(),
            config_path: None,
        }
    }
}

/// GitHub rendering service configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API base URL (`https://api.github.com` or a GitHub Enterprise `/api/v3` root).
    pub api_url: String,
    /// Render request timeout in seconds.
    pub timeout_secs: u64,
    /// Value for the `User-Agent` header.
    pub user_agent: String,
}

impl GithubConfig {
    /// Render request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_owned(),
            timeout_secs: 30,
            user_agent: "gfmv".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PreviewConfigRaw {
    template: Option<String>,
}

/// Resolved preview configuration.
#[derive(Debug, Default)]
pub struct PreviewConfig {
    /// Preview shell file. `None` selects the built-in shell.
    pub template: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SettingsConfigRaw {
    credentials_file: Option<String>,
}

/// Resolved settings store configuration.
#[derive(Debug)]
pub struct SettingsConfig {
    /// File holding the persisted identifier/secret pair.
    pub credentials_file: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from(
                shellexpand::tilde(DEFAULT_CREDENTIALS_FILE).into_owned(),
            ),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`github.api_url`").
        field: String,
        /// Error message (e.g., "${`GITHUB_API`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `gfmv.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(api_url) = &settings.api_url {
            self.github.api_url.clone_from(api_url);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.github.timeout_secs = timeout_secs;
        }
        if let Some(template) = &settings.template {
            self.preview_resolved.template = Some(template.clone());
        }
        if let Some(credentials_file) = &settings.credentials_file {
            self.settings_resolved
                .credentials_file
                .clone_from(credentials_file);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_github()?;
        Ok(())
    }

    fn validate_github(&self) -> Result<(), ConfigError> {
        const MAX_TIMEOUT_SECS: u64 = 600;

        require_non_empty(&self.github.api_url, "github.api_url")?;
        require_http_url(&self.github.api_url, "github.api_url")?;
        require_non_empty(&self.github.user_agent, "github.user_agent")?;

        if self.github.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "github.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.github.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "github.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.github.api_url = expand::expand_env(&self.github.api_url, "github.api_url")?;
        self.github.user_agent =
            expand::expand_env(&self.github.user_agent, "github.user_agent")?;

        if let Some(ref template) = self.preview.template {
            self.preview.template = Some(expand::expand_env(template, "preview.template")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.preview_resolved = PreviewConfig {
            template: self
                .preview
                .template
                .as_deref()
                .map(|template| config_dir.join(template)),
        };

        self.settings_resolved = match self.settings.credentials_file.as_deref() {
            Some(file) => SettingsConfig {
                credentials_file: config_dir
                    .join(expand::expand_path(file, "settings.credentials_file")?),
            },
            None => SettingsConfig::default(),
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.github.timeout(), Duration::from_secs(30));
        assert_eq!(config.github.user_agent, "gfmv");
        assert!(config.preview_resolved.template.is_none());
        assert!(
            config
                .settings_resolved
                .credentials_file
                .ends_with(".config/gfmv/credentials.toml")
        );
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.timeout_secs, 30);
    }

    #[test]
    fn test_parse_github_config() {
        let toml = r#"
[github]
api_url = "https://github.example.com/api/v3"
timeout_secs = 5
user_agent = "docs-team"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.github.timeout_secs, 5);
        assert_eq!(config.github.user_agent, "docs-team");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[preview]
template = "assets/Preview.html"

[settings]
credentials_file = "state/credentials.toml"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(
            config.preview_resolved.template,
            Some(PathBuf::from("/project/assets/Preview.html"))
        );
        assert_eq!(
            config.settings_resolved.credentials_file,
            PathBuf::from("/project/state/credentials.toml")
        );
    }

    #[test]
    fn test_resolve_paths_absolute_credentials_file() {
        let toml = r#"
[settings]
credentials_file = "/var/lib/gfmv/credentials.toml"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(
            config.settings_resolved.credentials_file,
            PathBuf::from("/var/lib/gfmv/credentials.toml")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[github]
timeout_secs = 10

[preview]
template = "Preview.html"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.github.timeout_secs, 10);
        assert_eq!(
            config.preview_resolved.template,
            Some(dir.path().join("Preview.html"))
        );
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/gfmv.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_apply_cli_settings_api_url() {
        let mut config = Config::default();
        let overrides = CliSettings {
            api_url: Some("http://localhost:9000".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.github.api_url, "http://localhost:9000");
        assert_eq!(config.github.timeout_secs, 30); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default();
        let overrides = CliSettings {
            timeout_secs: Some(3),
            template: Some(PathBuf::from("/custom/Preview.html")),
            credentials_file: Some(PathBuf::from("/tmp/creds.toml")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.github.timeout_secs, 3);
        assert_eq!(
            config.preview_resolved.template,
            Some(PathBuf::from("/custom/Preview.html"))
        );
        assert_eq!(
            config.settings_resolved.credentials_file,
            PathBuf::from("/tmp/creds.toml")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.preview_resolved.template.is_none());
    }

    #[test]
    fn test_expand_env_vars_github() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GFMV_TEST_GHE_HOST", "github.corp.example");
        }

        let toml = r#"
[github]
api_url = "https://${GFMV_TEST_GHE_HOST}/api/v3"
user_agent = "${GFMV_TEST_AGENT:-gfmv-ci}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.github.api_url, "https://github.corp.example/api/v3");
        assert_eq!(config.github.user_agent, "gfmv-ci");

        unsafe {
            std::env::remove_var("GFMV_TEST_GHE_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("GFMV_MISSING_VAR_CONFIG_TEST");
        }

        let toml = r#"
[github]
api_url = "${GFMV_MISSING_VAR_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("GFMV_MISSING_VAR_CONFIG_TEST"));
        assert!(err.to_string().contains("github.api_url"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_api_url_empty() {
        let mut config = Config::default();
        config.github.api_url = String::new();
        assert_validation_error(&config, &["github.api_url", "empty"]);
    }

    #[test]
    fn test_validate_api_url_invalid_scheme() {
        let mut config = Config::default();
        config.github.api_url = "ftp://api.github.com".to_owned();
        assert_validation_error(&config, &["github.api_url", "http"]);
    }

    #[test]
    fn test_validate_user_agent_empty() {
        let mut config = Config::default();
        config.github.user_agent = String::new();
        assert_validation_error(&config, &["github.user_agent"]);
    }

    #[test]
    fn test_validate_timeout_zero() {
        let mut config = Config::default();
        config.github.timeout_secs = 0;
        assert_validation_error(&config, &["timeout_secs", "greater than 0"]);
    }

    #[test]
    fn test_validate_timeout_too_high() {
        let mut config = Config::default();
        config.github.timeout_secs = 3600;
        assert_validation_error(&config, &["timeout_secs", "600"]);
    }

    #[test]
    fn test_load_rejects_cli_override_that_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            timeout_secs: Some(0),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
