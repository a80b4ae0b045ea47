//! Config command - Inspect the effective vdmove configuration
//!
//! Provides the `vdmove config` CLI command which:
//! 1. Shows the configuration after environment overrides (token masked)
//! 2. Validates it and lists every problem found

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use vdmove_core::config::Config;

use super::CommandContext;
use crate::output::{get_formatter, plural};

/// Replacement shown for a configured token
const MASK: &str = "********";

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the effective configuration
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Validate => self.execute_validate(ctx),
        }
    }

    fn execute_show(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        let config = masked(&ctx.config);

        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
            return Ok(());
        }

        if ctx.config_found {
            formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
        } else {
            formatter.success("Configuration (defaults, no file found)");
        }
        formatter.info("");

        let yaml =
            serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
        for line in yaml.lines() {
            formatter.info(line);
        }

        Ok(())
    }

    fn execute_validate(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);

        info!(config_path = %ctx.config_path.display(), "Validating configuration");

        let errors = ctx.config.validate();

        if ctx.format.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": ctx.config_path.display().to_string(),
                "config_found": ctx.config_found,
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", ctx.config_path.display()));
        } else {
            formatter.error(&format!("Configuration has {}:", plural(errors.len(), "error")));
            formatter.info(&format!("File: {}", ctx.config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}

/// Copy of `config` with the token hidden
fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    if let Some(token) = config.auth.token.as_mut() {
        if !token.is_empty() {
            *token = MASK.to_string();
        }
    }
    config
}
