//! Domain types and business rules
//!
//! - Newtypes for validated namespace prefixes
//! - Resource descriptors as returned by a tree listing
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod resource;

pub use errors::DomainError;
pub use newtypes::PathPrefix;
pub use resource::{ResourceDescriptor, ResourceKind};
