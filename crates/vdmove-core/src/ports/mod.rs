//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces that the core depends on, whose
//! implementations live in adapter crates.
//!
//! - [`IDiskProvider`] - Listing, folder creation and moves against the disk API

pub mod disk_provider;

pub use disk_provider::{FolderStatus, IDiskProvider};
