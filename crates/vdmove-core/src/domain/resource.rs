//! Resource descriptors
//!
//! A [`ResourceDescriptor`] is an immutable snapshot of one entry returned by
//! a tree listing. It carries no identity beyond its fully-qualified `path`.

use serde::{Deserialize, Serialize};

/// Whether a resource is a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Dir,
}

/// A file or directory entry in the provider's namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Last path segment
    pub name: String,
    /// Fully-qualified, namespace-prefixed path (e.g. `disk:/Photos/a.jpg`)
    pub path: String,
    /// File or directory
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Size in bytes; only reported for files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ResourceDescriptor {
    /// Build a directory descriptor for `path`, deriving `name` from its last segment
    pub fn dir(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            path,
            kind: ResourceKind::Dir,
            size: None,
        }
    }

    /// Build a file descriptor for `path`, deriving `name` from its last segment
    pub fn file(path: impl Into<String>, size: Option<u64>) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            path,
            kind: ResourceKind::File,
            size,
        }
    }

    /// Returns true if this is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == ResourceKind::Dir
    }

    /// Returns true if this is a file
    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }
}

fn last_segment(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed
        .rsplit_once('/')
        .map(|(_, name)| name)
        .unwrap_or(trimmed)
}
