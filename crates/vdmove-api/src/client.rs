//! Disk API client
//!
//! Provides an HTTP client for the Yandex Disk REST API. Handles the OAuth
//! authorization header, JSON bodies, error mapping and waiting on
//! asynchronous operations.
//!
//! Every request, status polls included, first takes a slot from the
//! client's [`RateLimiter`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reqwest::Method;
//! use vdmove_api::client::ApiClient;
//!
//! # async fn example() -> Result<(), vdmove_api::ApiError> {
//! let client = ApiClient::new("oauth-token-here");
//! let body = serde_json::json!({"from": "disk:/a.txt", "path": "vd:abc:disk:/a.txt", "overwrite": true});
//! let result = client
//!     .call(Method::POST, "/virtual-disks/resources/move", &[], Some(&body))
//!     .await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use reqwest::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::rate_limit::RateLimiter;
use crate::ApiError;

/// Base URL for the Yandex Disk REST API v1
pub const DISK_API_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk";

/// Operation status meaning the operation completed
const STATUS_SUCCESS: &str = "success";

/// Operation status meaning the operation gave up
const STATUS_FAILED: &str = "failed";

// ============================================================================
// API response types
// ============================================================================

/// Link object returned for asynchronous operations and created resources
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// Target URL; for a 202 response, the operation status URL
    pub href: String,
    /// HTTP method to use with `href`
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub templated: bool,
}

// ============================================================================
// PollPolicy
// ============================================================================

/// How to wait on an asynchronous operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between status checks
    pub interval: Duration,
    /// Status checks before giving up with [`ApiError::OperationTimeout`]
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 3600,
        }
    }
}

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client for disk API calls
///
/// Wraps `reqwest::Client` with the authorization header, base URL
/// construction, rate limiting and asynchronous operation polling.
pub struct ApiClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
    /// OAuth token
    token: String,
    /// Shared call limiter
    rate_limiter: Arc<RateLimiter>,
    /// Waiting policy for 202 responses
    poll: PollPolicy,
}

impl ApiClient {
    /// Creates a new ApiClient against the production API
    ///
    /// Uses a default limiter of 10 calls per second and the default poll policy.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DISK_API_BASE_URL)
    }

    /// Creates a new ApiClient with a custom base URL (useful for testing)
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            rate_limiter: Arc::new(RateLimiter::with_defaults()),
            poll: PollPolicy::default(),
        }
    }

    /// Replaces the rate limiter, e.g. to share one across clients
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    /// Replaces the poll policy for asynchronous operations
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Returns the rate limiter in use
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Returns the poll policy in use
    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Prepends the base URL and adds the authorization and JSON headers.
    /// Does not take a rate limit slot; [`call`](Self::call) does.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.authorize(self.client.request(method, &url))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    /// Issues one API call and returns its JSON result
    ///
    /// - 202 Accepted: waits for the operation named by the body's `href`
    ///   and returns its final status payload.
    /// - other 2xx: returns the parsed body, or `Value::Null` when empty.
    /// - anything else: [`ApiError::Http`] with the status and body.
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `endpoint` - API path relative to the base URL (e.g. "/resources")
    /// * `query` - Query parameters, URL-encoded by the client
    /// * `body` - Optional JSON request body
    pub async fn call(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.rate_limiter.wait_if_needed().await;

        let mut builder = self.request(method.clone(), endpoint).query(query);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(%method, endpoint, "Sending API request");
        let response = builder.send().await?;

        if response.status() == StatusCode::ACCEPTED {
            let link: Link = serde_json::from_value(read_json(response).await?).map_err(|e| {
                ApiError::InvalidResponse(format!("202 response without operation link: {e}"))
            })?;
            info!(endpoint, href = %link.href, "Operation accepted, waiting for completion");
            return self.wait_for_operation(&link.href).await;
        }

        read_json(response).await
    }

    /// Polls an operation status URL until it reports a terminal status
    ///
    /// Returns the final status payload on `success`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::OperationFailed`] when the status is `failed`
    /// - [`ApiError::OperationTimeout`] after `max_attempts` non-terminal checks
    /// - [`ApiError::Http`] / [`ApiError::Network`] when a status check itself fails
    pub async fn wait_for_operation(&self, href: &str) -> Result<Value, ApiError> {
        let url = Url::parse(href)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid operation href {href}: {e}")))?;
        let max_attempts = self.poll.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            self.rate_limiter.wait_if_needed().await;

            let response = self
                .authorize(self.client.get(url.clone()))
                .send()
                .await?;
            let payload = read_json(response).await?;

            match payload.get("status").and_then(Value::as_str) {
                Some(STATUS_SUCCESS) => {
                    debug!(href, attempt, "Operation succeeded");
                    return Ok(payload);
                }
                Some(STATUS_FAILED) => {
                    warn!(href, attempt, "Operation failed");
                    return Err(ApiError::OperationFailed {
                        href: href.to_string(),
                    });
                }
                Some(status) => debug!(href, attempt, status, "Operation still running"),
                None => {
                    return Err(ApiError::InvalidResponse(format!(
                        "operation status without 'status' field: {payload}"
                    )))
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.poll.interval).await;
            }
        }

        warn!(href, attempts = max_attempts, "Operation poll budget exhausted");
        Err(ApiError::OperationTimeout {
            href: href.to_string(),
            attempts: max_attempts,
        })
    }
}

/// Maps a response to its JSON body, or to [`ApiError::Http`] on a non-2xx status
async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(%status, body = %body, "API returned error status");
        return Err(ApiError::Http { status, body });
    }

    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::InvalidResponse(format!("response is not JSON: {e}")))
}
