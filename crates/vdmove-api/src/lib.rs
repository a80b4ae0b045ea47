//! vdmove API - Yandex Disk REST API client
//!
//! Provides an async client for:
//! - Rate-limited REST calls with OAuth token authentication
//! - Waiting on asynchronous provider operations (HTTP 202 + status polling)
//! - Paginated, recursive resource listing
//!
//! ## Modules
//!
//! - [`rate_limit`] - Sliding-window call ceiling
//! - [`client`] - HTTP client, error mapping and operation polling
//! - [`listing`] - Paginated tree listing
//! - [`provider`] - [`IDiskProvider`](vdmove_core::ports::IDiskProvider) adapter

pub mod client;
pub mod listing;
pub mod provider;
pub mod rate_limit;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when communicating with the disk API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code
        status: StatusCode,
        /// Raw response body, as far as it could be read
        body: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// An asynchronous operation reported failure
    #[error("Operation {href} failed")]
    OperationFailed {
        /// Status URL of the operation
        href: String,
    },

    /// An asynchronous operation did not finish within the poll budget
    #[error("Operation {href} still pending after {attempts} status checks")]
    OperationTimeout {
        /// Status URL of the operation
        href: String,
        /// Number of status checks made
        attempts: u32,
    },
}

impl ApiError {
    /// HTTP status of the failure, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the server reported a conflict (409), e.g. a folder that already exists
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }
}
