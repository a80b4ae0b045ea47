//! Paginated resource listing
//!
//! `GET /resources` returns the direct children of one folder, a page at a
//! time, under `_embedded.items`. This module follows the pagination and, for
//! a recursive listing, descends into every child folder until the whole
//! tree is materialized.
//!
//! ## Pagination
//!
//! A page with `_embedded._links.next` is followed by another request; the
//! link's `offset` (or `offset + items on this page` when absent) becomes the
//! next offset. Without a link, the reported `total` decides. An empty page
//! always ends the folder.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vdmove_api::client::ApiClient;
//! use vdmove_api::listing;
//!
//! # async fn example() -> Result<(), vdmove_api::ApiError> {
//! let client = ApiClient::new("oauth-token");
//! let items = listing::list_resources(&client, "disk:/", true, 1000).await?;
//! println!("Got {} items", items.len());
//! # Ok(())
//! # }
//! ```

use std::collections::{HashSet, VecDeque};

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use vdmove_core::domain::ResourceDescriptor;

use crate::client::ApiClient;
use crate::ApiError;

/// Path of the listing endpoint relative to the API base URL
const RESOURCES_PATH: &str = "/resources";

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Field projection: only what a transfer needs, plus pagination metadata
const LISTING_FIELDS: &str = "_embedded.items.name,_embedded.items.path,\
_embedded.items.type,_embedded.items.size,_embedded.offset,_embedded.limit,\
_embedded.total,_embedded._links";

/// Field projection for describing a single resource
const RESOURCE_FIELDS: &str = "name,path,type,size";

// ============================================================================
// API response types (JSON deserialization)
// ============================================================================

/// Raw response from `GET /resources`
#[derive(Debug, Deserialize)]
struct ResourceResponse {
    /// Folder contents; absent when the path is a file
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedPage>,
}

/// One page of folder contents
#[derive(Debug, Deserialize)]
struct EmbeddedPage {
    #[serde(default)]
    items: Vec<ResourceDescriptor>,
    offset: Option<u64>,
    /// Total number of children in the folder
    total: Option<u64>,
    #[serde(rename = "_links")]
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    offset: Option<u64>,
}

/// A single page of a folder listing
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Items on this page
    pub items: Vec<ResourceDescriptor>,
    /// Offset of the following page, `None` on the last page
    pub next_offset: Option<u64>,
}

impl ListingPage {
    fn from_response(response: ResourceResponse, requested_offset: u64) -> Self {
        let Some(page) = response.embedded else {
            return Self {
                items: Vec::new(),
                next_offset: None,
            };
        };

        let offset = page.offset.unwrap_or(requested_offset);
        let received = page.items.len() as u64;
        let following = offset + received;

        let next_offset = if received == 0 {
            None
        } else if let Some(next) = page.links.and_then(|l| l.next) {
            // a link that does not move forward would loop forever
            Some(next.offset.filter(|o| *o > offset).unwrap_or(following))
        } else {
            page.total.filter(|total| following < *total).map(|_| following)
        };

        Self {
            items: page.items,
            next_offset,
        }
    }
}

// ============================================================================
// Listing functions
// ============================================================================

/// Fetches one page of the contents of `path`
///
/// # Errors
///
/// Returns an error if the request fails, the API returns a non-success
/// status, or the body is not a listing.
pub async fn list_page(
    client: &ApiClient,
    path: &str,
    offset: u64,
    limit: u32,
) -> Result<ListingPage, ApiError> {
    let offset_str = offset.to_string();
    let limit_str = limit.max(1).to_string();
    let query = [
        ("path", path),
        ("fields", LISTING_FIELDS),
        ("limit", limit_str.as_str()),
        ("offset", offset_str.as_str()),
    ];

    let value = client
        .call(Method::GET, RESOURCES_PATH, &query, None)
        .await?;
    let response: ResourceResponse = serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("malformed listing for {path}: {e}")))?;

    Ok(ListingPage::from_response(response, offset))
}

/// Describes the resource at `path` itself
///
/// Returns `None` when the API answers 404.
pub async fn resource_info(
    client: &ApiClient,
    path: &str,
) -> Result<Option<ResourceDescriptor>, ApiError> {
    let query = [("path", path), ("fields", RESOURCE_FIELDS)];
    let value = match client.call(Method::GET, RESOURCES_PATH, &query, None).await {
        Ok(value) => value,
        Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
            debug!(path, "Resource not found");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ApiError::InvalidResponse(format!("malformed resource {path}: {e}")))
}

/// Fetches every direct child of `path`, following all pages
pub async fn list_children(
    client: &ApiClient,
    path: &str,
    page_size: u32,
) -> Result<Vec<ResourceDescriptor>, ApiError> {
    let mut items = Vec::new();
    let mut offset = 0;
    let mut pages: u32 = 0;

    loop {
        let page = list_page(client, path, offset, page_size).await?;
        pages += 1;

        debug!(
            path,
            page = pages,
            items = page.items.len(),
            has_next = page.next_offset.is_some(),
            "Received listing page"
        );

        items.extend(page.items);
        match page.next_offset {
            Some(next) => offset = next,
            None => break,
        }
    }

    Ok(items)
}

/// Lists everything under `path`
///
/// With `recursive`, every folder found is listed in turn (breadth-first),
/// so the result covers the whole subtree, not just the direct children.
/// The tree root itself is not included.
///
/// # Errors
///
/// The first failed page aborts the listing.
pub async fn list_resources(
    client: &ApiClient,
    path: &str,
    recursive: bool,
    page_size: u32,
) -> Result<Vec<ResourceDescriptor>, ApiError> {
    let mut items = Vec::new();
    let mut queue = VecDeque::from([path.to_string()]);
    let mut visited = HashSet::new();

    while let Some(folder) = queue.pop_front() {
        if !visited.insert(folder.clone()) {
            warn!(path = %folder, "Folder listed twice, skipping");
            continue;
        }

        let children = list_children(client, &folder, page_size).await?;
        if recursive {
            queue.extend(children.iter().filter(|c| c.is_dir()).map(|c| c.path.clone()));
        }
        items.extend(children);
    }

    debug!(
        path,
        recursive,
        total_items = items.len(),
        folders_listed = visited.len(),
        "Listing complete"
    );

    Ok(items)
}

// ============================================================================
// Tests
// ============================================================================
