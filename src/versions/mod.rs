//! versions
//!
//! Checking whether a newer version of a package is available.
//!
//! # Architecture
//!
//! The [`VersionSource`] trait abstracts the archive query. The session
//! asks a source for the versions in each distribution and then calls
//! [`check_available`] with the installed version. Query failures are
//! reported as warnings by the caller and never stop a report.
//!
//! # Modules
//!
//! - `compare`: Debian version ordering
//! - [`madison`]: HTTP source querying a madison service
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use bugsmith::versions::check_available;
//!
//! let mut available = BTreeMap::new();
//! available.insert("unstable".to_string(), "2.0-1".to_string());
//! available.insert("stable".to_string(), "1.0-1".to_string());
//!
//! let result = check_available("1.5-1", &available);
//! assert_eq!(result.newer.get("unstable").map(String::as_str), Some("2.0-1"));
//! assert!(!result.installed_is_newest);
//! ```

mod compare;
pub mod madison;
pub mod mock;

pub use compare::{compare_versions, DebianVersion};

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::PackageName;

/// Distributions queried when none are given.
pub const DEFAULT_DISTS: &[&str] = &["oldstable", "stable", "testing", "unstable", "experimental"];

/// Errors from version queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with an error status.
    #[error("version service returned HTTP {0}")]
    Status(u16),

    /// The source is not usable in this configuration.
    #[error("version checks unavailable: {0}")]
    Unavailable(String),
}

/// A source of archive version information.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Highest version of `package` in each of `dists`.
    ///
    /// Distributions without the package are absent from the map.
    async fn available(
        &self,
        package: &PackageName,
        dists: &[String],
    ) -> Result<BTreeMap<String, String>, VersionError>;
}

/// Outcome of comparing the installed version against the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    /// Distributions carrying a newer version, with that version
    pub newer: BTreeMap<String, String>,
    /// Every archive version is older than the installed one
    pub installed_is_newest: bool,
}

impl Availability {
    /// Whether any distribution has a newer version.
    pub fn has_newer(&self) -> bool {
        !self.newer.is_empty()
    }
}

/// Compare an installed version against the versions available.
pub fn check_available(installed: &str, available: &BTreeMap<String, String>) -> Availability {
    let mut newer = BTreeMap::new();
    let mut older = 0;

    for (dist, version) in available {
        match compare_versions(installed, version) {
            Ordering::Less => {
                newer.insert(dist.clone(), version.clone());
            }
            Ordering::Greater => older += 1,
            Ordering::Equal => {}
        }
    }

    Availability {
        newer,
        installed_is_newest: older > 0 && older == available.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avail(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(d, v)| (d.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn nothing_available() {
        let result = check_available("1.0", &BTreeMap::new());
        assert!(!result.has_newer());
        assert!(!result.installed_is_newest);
    }

    #[test]
    fn installed_newest_everywhere() {
        let result = check_available("3.0", &avail(&[("stable", "1.0"), ("unstable", "2.0")]));
        assert!(!result.has_newer());
        assert!(result.installed_is_newest);
    }

    #[test]
    fn equal_version_is_neither() {
        let result = check_available("2.0", &avail(&[("stable", "1.0"), ("unstable", "2.0")]));
        assert!(!result.has_newer());
        assert!(!result.installed_is_newest);
    }

    #[test]
    fn newer_in_some_dists() {
        let result = check_available(
            "1.0~rc1",
            &avail(&[("stable", "0.9"), ("testing", "1.0"), ("experimental", "1.1")]),
        );
        assert_eq!(result.newer.len(), 2);
        assert!(result.newer.contains_key("testing"));
        assert!(!result.installed_is_newest);
    }
}
