//! Configuration module for vdmove.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PathPrefix};

/// Environment variable holding the OAuth token.
pub const ENV_TOKEN: &str = "VDMOVE_TOKEN";

/// Environment variable holding the virtual disk hash.
pub const ENV_VD_HASH: &str = "VDMOVE_VD_HASH";

/// Placeholder token shipped in sample configs; never a real credential.
pub const PLACEHOLDER_TOKEN: &str = "your_oauth_token_here";

/// Placeholder virtual disk hash shipped in sample configs.
pub const PLACEHOLDER_VD_HASH: &str = "your_virtual_disk_hash";

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for vdmove.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub disk: DiskConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// OAuth token. `None` until set in the file or via `VDMOVE_TOKEN`.
    pub token: Option<String>,
}

/// Source and destination namespaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Hash of the destination virtual disk. `None` until set in the file or
    /// via `VDMOVE_VD_HASH`.
    pub virtual_disk_id: Option<String>,
    /// Root of the personal namespace that is rewritten onto the virtual disk.
    pub source_root: String,
}

/// REST API and throttling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Items requested per listing page.
    pub page_size: u32,
    /// Ceiling on calls in any trailing one-second window.
    pub requests_per_second: u32,
    /// Delay between status checks of an asynchronous operation.
    pub poll_interval_ms: u64,
    /// Status checks before an asynchronous operation is declared stuck.
    pub max_poll_attempts: u32,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/vdmove/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("vdmove")
            .join("config.yaml")
    }

    /// Override credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Override credentials from `lookup`, which maps a variable name to its value.
    ///
    /// Empty values are ignored so that an exported-but-blank variable does
    /// not mask the file setting.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.auth.token = Some(token);
        }
        if let Some(id) = non_empty(ENV_VD_HASH) {
            self.disk.virtual_disk_id = Some(id);
        }
    }

    /// Prefix that listed paths are rewritten from.
    pub fn source_prefix(&self) -> Result<PathPrefix, DomainError> {
        PathPrefix::new(self.disk.source_root.clone())
    }

    /// Prefix of the destination virtual disk.
    pub fn destination_prefix(&self) -> Result<PathPrefix, DomainError> {
        PathPrefix::virtual_disk(self.disk.virtual_disk_id.as_deref().unwrap_or_default())
    }
}

impl ApiConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            virtual_disk_id: None,
            source_root: crate::domain::newtypes::PERSONAL_ROOT.to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 1000,
            requests_per_second: 10,
            poll_interval_ms: 1000,
            max_poll_attempts: 3600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"auth.token"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- auth ---
        match self.auth.token.as_deref().map(str::trim) {
            None | Some("") => errors.push(ValidationError {
                field: "auth.token".into(),
                message: format!("not set; export {ENV_TOKEN} or set auth.token"),
            }),
            Some(PLACEHOLDER_TOKEN) => errors.push(ValidationError {
                field: "auth.token".into(),
                message: format!("still the placeholder '{PLACEHOLDER_TOKEN}'"),
            }),
            Some(_) => {}
        }

        // --- disk ---
        match self.disk.virtual_disk_id.as_deref().map(str::trim) {
            None | Some("") => errors.push(ValidationError {
                field: "disk.virtual_disk_id".into(),
                message: format!("not set; export {ENV_VD_HASH} or set disk.virtual_disk_id"),
            }),
            Some(PLACEHOLDER_VD_HASH) => errors.push(ValidationError {
                field: "disk.virtual_disk_id".into(),
                message: format!("still the placeholder '{PLACEHOLDER_VD_HASH}'"),
            }),
            Some(_) => {
                if let Err(e) = self.destination_prefix() {
                    errors.push(ValidationError {
                        field: "disk.virtual_disk_id".into(),
                        message: e.to_string(),
                    });
                }
            }
        }
        if let Err(e) = self.source_prefix() {
            errors.push(ValidationError {
                field: "disk.source_root".into(),
                message: e.to_string(),
            });
        }

        // --- api ---
        if url::Url::parse(&self.api.base_url).is_err() {
            errors.push(ValidationError {
                field: "api.base_url".into(),
                message: format!("not a valid URL: {}", self.api.base_url),
            });
        }
        if self.api.page_size == 0 {
            errors.push(ValidationError {
                field: "api.page_size".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.api.requests_per_second == 0 {
            errors.push(ValidationError {
                field: "api.requests_per_second".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.api.poll_interval_ms == 0 {
            errors.push(ValidationError {
                field: "api.poll_interval_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.api.max_poll_attempts == 0 {
            errors.push(ValidationError {
                field: "api.max_poll_attempts".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use vdmove_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .token("y0_AgAAAA")
///     .virtual_disk_id("abc123")
///     .requests_per_second(5)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.auth.token = Some(token.into());
        self
    }

    pub fn virtual_disk_id(mut self, id: impl Into<String>) -> Self {
        self.config.disk.virtual_disk_id = Some(id.into());
        self
    }

    pub fn source_root(mut self, root: impl Into<String>) -> Self {
        self.config.disk.source_root = root.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn page_size(mut self, n: u32) -> Self {
        self.config.api.page_size = n;
        self
    }

    pub fn requests_per_second(mut self, n: u32) -> Self {
        self.config.api.requests_per_second = n;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.api.poll_interval_ms = ms;
        self
    }

    pub fn max_poll_attempts(mut self, n: u32) -> Self {
        self.config.api.max_poll_attempts = n;
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Consume the builder and return the [`Config`] without validation.
    pub fn build(self) -> Config {
        self.config
    }

    /// Consume the builder, validate, and return the [`Config`] or all errors.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let errors = self.config.validate();
        if errors.is_empty() {
            Ok(self.config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
