//! Domain error types
//!
//! Errors raised by path rewriting and prefix construction.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A resource path does not live under the prefix it is being rewritten from
    #[error("Path {path} is not under prefix {prefix}")]
    PathOutsidePrefix {
        /// The offending resource path
        path: String,
        /// The prefix that was expected at the front of `path`
        prefix: String,
    },

    /// A namespace prefix is empty or malformed
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// A virtual disk identifier is empty or contains a separator
    #[error("Invalid virtual disk id: {0}")]
    InvalidVirtualDiskId(String),
}
