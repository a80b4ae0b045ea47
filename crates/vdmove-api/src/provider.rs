//! DiskApiProvider - IDiskProvider implementation for the Yandex Disk API
//!
//! Wraps the [`ApiClient`] and delegates to the listing and client modules to
//! fulfil the [`IDiskProvider`] port contract.
//!
//! ## Design Notes
//!
//! - A 409 on folder creation means the folder is already there and maps to
//!   [`FolderStatus::AlreadyExists`]; every other failure is returned.
//! - Moves may be answered with 202; the client waits for the operation, so
//!   `move_resource` returns only once the move has finished.

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, warn};

use vdmove_core::domain::ResourceDescriptor;
use vdmove_core::ports::{FolderStatus, IDiskProvider};

use crate::client::ApiClient;
use crate::listing::{self, DEFAULT_PAGE_SIZE};

/// Folder create/list endpoint
const RESOURCES_PATH: &str = "/resources";

/// Cross-namespace move endpoint
const MOVE_PATH: &str = "/virtual-disks/resources/move";

/// Request body for a virtual disk move
#[derive(Debug, Serialize)]
struct MoveRequest<'a> {
    from: &'a str,
    path: &'a str,
    overwrite: bool,
}

// ============================================================================
// DiskApiProvider
// ============================================================================

/// Disk provider implementation that delegates to the Yandex Disk REST API
pub struct DiskApiProvider {
    client: ApiClient,
    /// Items requested per listing page
    page_size: u32,
}

impl DiskApiProvider {
    /// Creates a new `DiskApiProvider` wrapping the given [`ApiClient`]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the listing page size (0 is treated as 1)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns the listing page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the underlying client
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IDiskProvider for DiskApiProvider {
    async fn list_tree(&self, path: &str, recursive: bool) -> Result<Vec<ResourceDescriptor>> {
        listing::list_resources(&self.client, path, recursive, self.page_size)
            .await
            .with_context(|| format!("Failed to list {path}"))
    }

    async fn resource_info(&self, path: &str) -> Result<Option<ResourceDescriptor>> {
        listing::resource_info(&self.client, path)
            .await
            .with_context(|| format!("Failed to look up {path}"))
    }

    async fn ensure_folder(&self, path: &str) -> Result<FolderStatus> {
        match self
            .client
            .call(Method::PUT, RESOURCES_PATH, &[("path", path)], None)
            .await
        {
            Ok(_) => {
                debug!(path, "Folder created");
                Ok(FolderStatus::Created)
            }
            Err(e) if e.is_conflict() => {
                warn!(path, "Folder already exists");
                Ok(FolderStatus::AlreadyExists)
            }
            Err(e) => Err(e).with_context(|| format!("Folder creation request for {path} failed")),
        }
    }

    async fn move_resource(&self, from: &str, to: &str, overwrite: bool) -> Result<()> {
        let body = serde_json::to_value(MoveRequest {
            from,
            path: to,
            overwrite,
        })
        .context("Failed to encode move request")?;

        self.client
            .call(Method::POST, MOVE_PATH, &[], Some(&body))
            .await
            .with_context(|| format!("Move request {from} -> {to} failed"))?;
        Ok(())
    }
}
