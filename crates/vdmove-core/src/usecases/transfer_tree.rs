//! Tree transfer use case
//!
//! Moves a listed resource tree from one namespace into another:
//!
//! 1. **Plan**: partition descriptors into directories and files and rewrite
//!    each path from the source prefix onto the destination prefix.
//! 2. **Folders**: ensure every target directory exists, in descending
//!    lexicographic order of the target path. "Already exists" counts as done.
//! 3. **Files**: move every file into place with `overwrite = true`.
//!
//! The first unrecoverable error aborts the rest of the transfer. Nothing
//! already moved is rolled back.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{DomainError, PathPrefix, ResourceDescriptor};
use crate::ports::{FolderStatus, IDiskProvider};

/// One file move computed by [`TransferTreeUseCase::plan`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    /// Source path in the personal namespace
    pub from: String,
    /// Target path in the destination namespace
    pub to: String,
}

/// Every remote call a transfer will issue, in issue order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferPlan {
    /// Target folders, deduplicated, in descending lexicographic order
    pub folders: Vec<String>,
    /// File moves, in listing order
    pub moves: Vec<PlannedMove>,
}

/// Progress notification emitted right before each remote call
#[derive(Debug, Clone, Copy)]
pub enum TransferEvent<'a> {
    /// About to ensure a folder exists
    EnsureFolder {
        path: &'a str,
        index: usize,
        total: usize,
    },
    /// About to move a file
    MoveFile {
        from: &'a str,
        to: &'a str,
        index: usize,
        total: usize,
    },
}

/// Summary of a completed transfer
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    pub folders_created: usize,
    pub folders_existing: usize,
    pub files_moved: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TransferReport {
    /// Wall-clock duration of the transfer in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

type ProgressFn = Box<dyn Fn(&TransferEvent<'_>) + Send + Sync>;

/// Use case for moving a resource tree between namespaces
pub struct TransferTreeUseCase {
    provider: Arc<dyn IDiskProvider>,
    progress: Option<ProgressFn>,
}

impl TransferTreeUseCase {
    /// Creates a new TransferTreeUseCase over the given provider
    pub fn new(provider: Arc<dyn IDiskProvider>) -> Self {
        Self {
            provider,
            progress: None,
        }
    }

    /// Registers a callback invoked before every folder and move call
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&TransferEvent<'_>) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Computes the folder and move calls for `items` without touching the provider
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::PathOutsidePrefix`] if any descriptor does not
    /// live under `source`.
    pub fn plan(
        items: &[ResourceDescriptor],
        source: &PathPrefix,
        dest: &PathPrefix,
    ) -> Result<TransferPlan, DomainError> {
        let mut folders = BTreeSet::new();
        for item in items.iter().filter(|i| i.is_dir()) {
            folders.insert(source.rewrite(&item.path, dest)?);
        }

        let moves = items
            .iter()
            .filter(|i| i.is_file())
            .map(|item| {
                Ok(PlannedMove {
                    from: item.path.clone(),
                    to: source.rewrite(&item.path, dest)?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(TransferPlan {
            folders: folders.into_iter().rev().collect(),
            moves,
        })
    }

    /// Plans and runs the transfer of `items` from `source` into `dest`
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails, if a folder cannot be ensured for
    /// any reason other than it already existing, or if any move fails. The
    /// remaining calls are not issued.
    pub async fn execute(
        &self,
        items: &[ResourceDescriptor],
        source: &PathPrefix,
        dest: &PathPrefix,
    ) -> Result<TransferReport> {
        let plan = Self::plan(items, source, dest).context("Failed to plan transfer")?;
        self.run(&plan).await
    }

    /// Runs a previously computed plan
    pub async fn run(&self, plan: &TransferPlan) -> Result<TransferReport> {
        let started_at = Utc::now();
        let mut folders_created = 0;
        let mut folders_existing = 0;

        debug!(
            folders = plan.folders.len(),
            files = plan.moves.len(),
            "Starting transfer"
        );

        let total = plan.folders.len();
        for (index, folder) in plan.folders.iter().enumerate() {
            self.emit(&TransferEvent::EnsureFolder {
                path: folder,
                index,
                total,
            });

            match self
                .provider
                .ensure_folder(folder)
                .await
                .with_context(|| format!("Failed to create folder {folder}"))?
            {
                FolderStatus::Created => {
                    info!(path = %folder, "Created folder");
                    folders_created += 1;
                }
                FolderStatus::AlreadyExists => {
                    debug!(path = %folder, "Folder already exists");
                    folders_existing += 1;
                }
            }
        }

        let total = plan.moves.len();
        for (index, mv) in plan.moves.iter().enumerate() {
            self.emit(&TransferEvent::MoveFile {
                from: &mv.from,
                to: &mv.to,
                index,
                total,
            });
            info!(from = %mv.from, to = %mv.to, "Moving");

            self.provider
                .move_resource(&mv.from, &mv.to, true)
                .await
                .with_context(|| format!("Failed to move {} to {}", mv.from, mv.to))?;
        }

        let report = TransferReport {
            folders_created,
            folders_existing,
            files_moved: plan.moves.len(),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            folders_created = report.folders_created,
            folders_existing = report.folders_existing,
            files_moved = report.files_moved,
            "Transfer complete"
        );

        Ok(report)
    }

    fn emit(&self, event: &TransferEvent<'_>) {
        if let Some(progress) = &self.progress {
            progress(event);
        }
    }
}
