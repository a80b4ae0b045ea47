//! Disk provider port (driven/secondary port)
//!
//! Interface for the remote operations a migration needs: describing and
//! listing a tree, ensuring a folder exists and moving a resource into
//! another namespace.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific.
//! - Uses `#[async_trait]` for async trait methods.
//! - "Already exists" on folder creation is not an error; adapters report it
//!   as [`FolderStatus::AlreadyExists`].

use crate::domain::ResourceDescriptor;

/// Outcome of a folder-ensure call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    /// The folder did not exist and was created
    Created,
    /// The provider reported that the folder was already there
    AlreadyExists,
}

/// Port trait for disk provider operations
///
/// Implementations handle authentication, rate limiting and waiting on
/// asynchronous provider operations. Every method returns only once the
/// remote side has reached a terminal state for the request.
#[async_trait::async_trait]
pub trait IDiskProvider: Send + Sync {
    /// Lists every resource under `path`
    ///
    /// With `recursive`, nested directories are listed too. The returned
    /// sequence is fully materialized.
    async fn list_tree(
        &self,
        path: &str,
        recursive: bool,
    ) -> anyhow::Result<Vec<ResourceDescriptor>>;

    /// Describes the resource at `path` itself, `None` if nothing is there
    async fn resource_info(&self, path: &str) -> anyhow::Result<Option<ResourceDescriptor>>;

    /// Creates the folder at `path` unless it already exists
    async fn ensure_folder(&self, path: &str) -> anyhow::Result<FolderStatus>;

    /// Moves the resource at `from` to `to`
    async fn move_resource(&self, from: &str, to: &str, overwrite: bool) -> anyhow::Result<()>;
}
