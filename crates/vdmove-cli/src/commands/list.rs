//! List command - Show the tree a migration would pick up
//!
//! Provides the `vdmove list` CLI command. It only reads, so it needs a
//! token but no destination disk.

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use vdmove_core::domain::ResourceDescriptor;
use vdmove_core::ports::IDiskProvider;

use super::{resolve_source, CommandContext};
use crate::output::{format_size, get_formatter, plural};

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Folder to list, absolute (disk:/Photos) or relative to the source root
    #[arg(long)]
    pub source: Option<String>,

    /// Only list direct children
    #[arg(long)]
    pub no_recursive: bool,
}

impl ListCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        ctx.require_valid(formatter.as_ref(), &["disk.virtual_disk_id"])?;

        let source = ctx.config.source_prefix()?;
        let listed = resolve_source(&source, self.source.as_deref())?;
        let recursive = !self.no_recursive;

        info!(source = %listed, recursive, "Listing resources");

        let provider = ctx.provider();
        let mut items = if listed == source.as_str() {
            Vec::new()
        } else {
            match provider.resource_info(&listed).await? {
                None => bail!("Source {listed} does not exist"),
                Some(target) if target.is_file() => vec![target],
                Some(_) => Vec::new(),
            }
        };
        if items.is_empty() {
            items = provider
                .list_tree(&listed, recursive)
                .await
                .with_context(|| format!("Failed to list {listed}"))?;
        }
        items.sort_by(|a, b| a.path.cmp(&b.path));

        let summary = Summary::of(&items);

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "path": listed,
                "recursive": recursive,
                "folders": summary.folders,
                "files": summary.files,
                "total_size": summary.bytes,
                "items": items,
            }));
            return Ok(());
        }

        if items.is_empty() {
            formatter.success(&format!("{listed} is empty"));
            return Ok(());
        }

        formatter.success(&format!(
            "{listed}: {}, {} ({})",
            plural(summary.folders, "folder"),
            plural(summary.files, "file"),
            format_size(summary.bytes)
        ));
        for item in &items {
            match item.size {
                Some(size) if item.is_file() => {
                    formatter.info(&format!("file  {}  {}", item.path, format_size(size)));
                }
                _ if item.is_file() => formatter.info(&format!("file  {}", item.path)),
                _ => formatter.info(&format!("dir   {}", item.path)),
            }
        }

        Ok(())
    }
}

/// Counts over a listing
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    folders: usize,
    files: usize,
    bytes: u64,
}

impl Summary {
    fn of(items: &[ResourceDescriptor]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            if item.is_dir() {
                acc.folders += 1;
            } else {
                acc.files += 1;
                acc.bytes += item.size.unwrap_or(0);
            }
            acc
        })
    }
}
