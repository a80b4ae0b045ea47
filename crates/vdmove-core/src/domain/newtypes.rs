//! Domain newtypes with validation
//!
//! [`PathPrefix`] marks the root of a provider namespace, such as the
//! personal disk (`disk:/`) or a virtual disk (`vd:<hash>:disk:/`), and
//! implements the prefix rewrite used to map a resource from one namespace
//! into another.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Root of the user's personal disk namespace
pub const PERSONAL_ROOT: &str = "disk:/";

/// Root of a namespace in the provider's path syntax
///
/// A prefix is never empty and always ends with `/`, so stripping it from a
/// resource path leaves a relative remainder with no leading separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPrefix(String);

impl PathPrefix {
    /// Create a prefix from a raw string
    pub fn new(prefix: impl Into<String>) -> Result<Self, DomainError> {
        let prefix = prefix.into();
        if prefix.is_empty() || !prefix.ends_with('/') {
            return Err(DomainError::InvalidPrefix(prefix));
        }
        Ok(Self(prefix))
    }

    /// The personal disk root, `disk:/`
    #[must_use]
    pub fn personal() -> Self {
        Self(PERSONAL_ROOT.to_string())
    }

    /// The root of the virtual disk identified by `id`, `vd:<id>:disk:/`
    pub fn virtual_disk(id: &str) -> Result<Self, DomainError> {
        let id = id.trim();
        if id.is_empty() || id.contains(|c: char| c == ':' || c == '/' || c.is_whitespace()) {
            return Err(DomainError::InvalidVirtualDiskId(id.to_string()));
        }
        Ok(Self(format!("vd:{id}:{PERSONAL_ROOT}")))
    }

    /// Get the prefix as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `path` lives under this prefix
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        path.starts_with(&self.0)
    }

    /// Strip this prefix once from the front of `path`
    pub fn relative<'a>(&self, path: &'a str) -> Result<&'a str, DomainError> {
        path.strip_prefix(self.0.as_str())
            .ok_or_else(|| DomainError::PathOutsidePrefix {
                path: path.to_string(),
                prefix: self.0.clone(),
            })
    }

    /// Map `path` from this namespace into `dest`
    ///
    /// The remainder after the prefix is carried over verbatim, separators
    /// included: `disk:/Photos/a.jpg` rewritten into `vd:ABC:disk:/` becomes
    /// `vd:ABC:disk:/Photos/a.jpg`.
    pub fn rewrite(&self, path: &str, dest: &PathPrefix) -> Result<String, DomainError> {
        let rel = self.relative(path)?;
        Ok(format!("{}{}", dest.0, rel))
    }

    /// Every directory between this prefix and `path`, shallowest first,
    /// including `path` itself
    ///
    /// `disk:/a/b` under `disk:/` yields `["disk:/a", "disk:/a/b"]`. The
    /// prefix itself is never included.
    pub fn ancestors_of(&self, path: &str) -> Result<Vec<String>, DomainError> {
        let rel = self.relative(path)?.trim_end_matches('/');
        let mut dirs = Vec::new();
        let mut current = self.0.clone();
        for segment in rel.split('/').filter(|s| !s.is_empty()) {
            if !current.ends_with('/') {
                current.push('/');
            }
            current.push_str(segment);
            dirs.push(current.clone());
        }
        Ok(dirs)
    }
}

impl Display for PathPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PathPrefix {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PathPrefix> for String {
    fn from(prefix: PathPrefix) -> Self {
        prefix.0
    }
}
