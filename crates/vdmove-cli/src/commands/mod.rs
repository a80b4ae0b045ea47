//! CLI command implementations and the wiring they share

pub mod config;
pub mod list;
pub mod migrate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use thiserror::Error;
use tracing::info;

use vdmove_api::client::{ApiClient, PollPolicy};
use vdmove_api::provider::DiskApiProvider;
use vdmove_api::rate_limit::{RateLimitConfig, RateLimiter};
use vdmove_core::config::{Config, ValidationError, ENV_TOKEN, ENV_VD_HASH};
use vdmove_core::domain::{PathPrefix, ResourceDescriptor};
use vdmove_core::ports::IDiskProvider;

use crate::output::{OutputFormat, OutputFormatter};

/// Raised after configuration problems have been reported to the user
#[derive(Debug, Error)]
#[error("configuration has {count} problem(s)")]
pub struct InvalidConfig {
    pub count: usize,
}

/// State shared by every command
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    /// Whether `config_path` was read (false when running on defaults)
    pub config_found: bool,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Loads configuration and applies environment overrides
    ///
    /// An explicitly named file must exist and parse. The default file is
    /// optional, but one that exists must parse too.
    pub fn load(explicit: Option<&Path>, format: OutputFormat) -> Result<Self> {
        Self::load_from(explicit, Config::default_path(), format)
    }

    fn load_from(
        explicit: Option<&Path>,
        default_path: PathBuf,
        format: OutputFormat,
    ) -> Result<Self> {
        let (config_path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (default_path, false),
        };

        let config_found = required || config_path.exists();
        let mut config = if config_found {
            Config::load(&config_path).with_context(|| {
                format!("Failed to load configuration {}", config_path.display())
            })?
        } else {
            Config::default()
        };
        config.apply_env();

        Ok(Self {
            config,
            config_path,
            config_found,
            format,
        })
    }

    /// Checks the configuration, printing every problem with guidance
    ///
    /// Problems in fields listed in `ignore` are not reported.
    pub fn require_valid(&self, formatter: &dyn OutputFormatter, ignore: &[&str]) -> Result<()> {
        let errors: Vec<ValidationError> = self
            .config
            .validate()
            .into_iter()
            .filter(|e| !ignore.contains(&e.field.as_str()))
            .collect();

        if errors.is_empty() {
            return Ok(());
        }

        if self.format.is_json() {
            let problems: Vec<_> = errors
                .iter()
                .map(|e| serde_json::json!({"field": e.field, "message": e.message}))
                .collect();
            formatter.print_json(&serde_json::json!({
                "success": false,
                "config_path": self.config_path.display().to_string(),
                "errors": problems,
            }));
        } else {
            formatter.error("Configuration is invalid");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
            formatter.info("");
            formatter.info(&format!(
                "Export {ENV_TOKEN}=<OAuth token> and {ENV_VD_HASH}=<virtual disk id>,"
            ));
            formatter.info(&format!("or set them in {}", self.config_path.display()));
        }

        Err(InvalidConfig {
            count: errors.len(),
        }
        .into())
    }

    /// Builds the API provider described by the configuration
    pub fn provider(&self) -> DiskApiProvider {
        let api = &self.config.api;
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::per_second(
            api.requests_per_second,
        )));
        let client = ApiClient::with_base_url(
            self.config.auth.token.clone().unwrap_or_default(),
            api.base_url.as_str(),
        )
        .with_rate_limiter(limiter)
        .with_poll_policy(PollPolicy {
            interval: api.poll_interval(),
            max_attempts: api.max_poll_attempts,
        });

        info!(
            base_url = %api.base_url,
            requests_per_second = api.requests_per_second,
            page_size = api.page_size,
            "Disk API client ready"
        );

        DiskApiProvider::new(client).with_page_size(api.page_size)
    }
}

/// Resolves `--source` against the configured source root
///
/// Accepts a full path (`disk:/Photos`) or one relative to the root
/// (`Photos`). The result must lie under `root`.
pub fn resolve_source(root: &PathPrefix, requested: Option<&str>) -> Result<String> {
    let Some(requested) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(root.to_string());
    };

    let full = if requested.contains(':') {
        requested.to_string()
    } else {
        format!("{root}{}", requested.trim_start_matches('/'))
    };

    if full == root.as_str() {
        return Ok(full);
    }

    let full = full.trim_end_matches('/').to_string();
    if !root.contains(&full) || full.len() <= root.as_str().len() {
        bail!("Source {requested} is not inside {root}");
    }
    Ok(full)
}

/// Collects the descriptors a migration of `listed` covers
///
/// For the root this is the recursive listing. For anything below it, the
/// folders between `root` and `listed` come first, then either the listed
/// folder's subtree or the single listed file.
///
/// # Errors
///
/// Fails if `listed` does not exist.
pub async fn collect_source(
    provider: &dyn IDiskProvider,
    root: &PathPrefix,
    listed: &str,
) -> Result<Vec<ResourceDescriptor>> {
    if listed == root.as_str() {
        return provider.list_tree(listed, true).await;
    }

    let Some(target) = provider.resource_info(listed).await? else {
        bail!("Source {listed} does not exist");
    };
    let children = if target.is_dir() {
        provider.list_tree(listed, true).await?
    } else {
        Vec::new()
    };
    with_parent_folders(root, target, children)
}

/// Prepends the folders between `root` and `target` to `children`
///
/// A folder target is itself one of those folders. A file target is kept
/// as a file, after its parents.
pub fn with_parent_folders(
    root: &PathPrefix,
    target: ResourceDescriptor,
    children: Vec<ResourceDescriptor>,
) -> Result<Vec<ResourceDescriptor>> {
    let mut folders = root.ancestors_of(&target.path)?;
    if target.is_file() {
        folders.pop();
    }

    let mut all: Vec<ResourceDescriptor> =
        folders.into_iter().map(ResourceDescriptor::dir).collect();
    if target.is_file() {
        all.push(target);
    }
    all.extend(children);
    Ok(all)
}
