//! Migrate command - Move a personal tree into the virtual disk
//!
//! Provides the `vdmove migrate` CLI command which:
//! 1. Validates credentials and the destination disk id
//! 2. Lists the source tree recursively (or describes a single source file)
//! 3. Plans folder creation and file moves
//! 4. Runs the plan (or only prints it with `--dry-run`) and reports results

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use vdmove_core::ports::IDiskProvider;
use vdmove_core::usecases::{TransferEvent, TransferPlan, TransferReport, TransferTreeUseCase};

use super::{collect_source, resolve_source, CommandContext};
use crate::output::{
    format_duration, get_formatter, plural, HumanFormatter, OutputFormatter,
};

#[derive(Debug, Args)]
pub struct MigrateCommand {
    /// Folder or file to migrate, absolute (disk:/Photos) or relative to the source root
    #[arg(long)]
    pub source: Option<String>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,
}

impl MigrateCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        ctx.require_valid(formatter.as_ref(), &[])?;

        let source = ctx.config.source_prefix()?;
        let dest = ctx.config.destination_prefix()?;
        let listed = resolve_source(&source, self.source.as_deref())?;

        info!(
            config_path = %ctx.config_path.display(),
            source = %listed,
            destination = %dest,
            dry_run = self.dry_run,
            "Starting migration"
        );

        let provider: Arc<dyn IDiskProvider> = Arc::new(ctx.provider());

        formatter.info(&format!("Listing {listed}..."));
        let items = collect_source(provider.as_ref(), &source, &listed)
            .await
            .context("Failed to list source tree")?;

        let plan = TransferTreeUseCase::plan(&items, &source, &dest)
            .context("Failed to plan transfer")?;
        formatter.info(&format!(
            "Found {} and {} to move into {dest}",
            plural(plan.folders.len(), "folder"),
            plural(plan.moves.len(), "file")
        ));

        if self.dry_run {
            print_plan(formatter.as_ref(), &plan, ctx.format.is_json())?;
            return Ok(());
        }

        let mut use_case = TransferTreeUseCase::new(provider);
        if !ctx.format.is_json() {
            use_case = use_case.with_progress(print_progress);
        }
        let report = use_case.run(&plan).await?;

        print_report(formatter.as_ref(), &report, ctx.format.is_json())
    }
}

fn print_progress(event: &TransferEvent<'_>) {
    let out = HumanFormatter;
    match *event {
        TransferEvent::EnsureFolder { path, index, total } => {
            out.info(&format!("[{}/{}] folder {}", index + 1, total, path));
        }
        TransferEvent::MoveFile {
            from, index, total, ..
        } => {
            out.info(&format!("[{}/{}] move {}", index + 1, total, from));
        }
    }
}

fn print_plan(formatter: &dyn OutputFormatter, plan: &TransferPlan, json: bool) -> Result<()> {
    if json {
        let mut value =
            serde_json::to_value(plan).context("Failed to serialize transfer plan")?;
        value["dry_run"] = serde_json::Value::Bool(true);
        formatter.print_json(&value);
        return Ok(());
    }

    formatter.info("Dry run mode - no changes will be made");
    formatter.info("");
    for folder in &plan.folders {
        formatter.info(&format!("mkdir {folder}"));
    }
    for mv in &plan.moves {
        formatter.info(&format!("move  {} -> {}", mv.from, mv.to));
    }
    formatter.success("Dry run completed (no changes)");
    Ok(())
}

fn print_report(formatter: &dyn OutputFormatter, report: &TransferReport, json: bool) -> Result<()> {
    if json {
        let mut value = serde_json::to_value(report).context("Failed to serialize report")?;
        value["duration_ms"] = serde_json::json!(report.duration_ms());
        value["success"] = serde_json::Value::Bool(true);
        formatter.print_json(&value);
        return Ok(());
    }

    if report.files_moved == 0 && report.folders_created == 0 {
        formatter.success("Nothing to migrate");
    } else {
        formatter.success(&format!(
            "Migration completed in {}",
            format_duration(report.duration_ms())
        ));
    }
    formatter.info(&format!(
        "Folders: {} created, {} already present",
        report.folders_created, report.folders_existing
    ));
    formatter.info(&format!("Moved:   {}", plural(report.files_moved, "file")));
    if let Some(message) = existing_folders_warning(report) {
        formatter.warn(&message);
    }
    Ok(())
}

/// Folders that answered 409 were either created by an earlier run or
/// could not be created under a missing parent
fn existing_folders_warning(report: &TransferReport) -> Option<String> {
    (report.folders_existing > 0).then(|| {
        format!(
            "{} reported as already existing on the virtual disk",
            plural(report.folders_existing, "folder")
        )
    })
}
