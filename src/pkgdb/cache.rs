//! pkgdb::cache
//!
//! Package status lookup cache.
//!
//! # Design
//!
//! The cache is keyed by package name. Misses are stored too, so an
//! unknown package is looked up once. The caller owns the cache and passes
//! it to [`lookup_status`] explicitly; there is no process-wide state.
//!
//! Cache invalidation:
//! - `invalidate(name)` drops one entry
//! - `clear()` drops everything

use std::collections::HashMap;

use super::{PackageDb, PackageDbError, PackageStatus};
use crate::core::types::PackageName;

/// Cache of package lookups for one session.
#[derive(Debug, Default)]
pub struct StatusCache {
    /// Map of package name to lookup result
    entries: HashMap<String, Option<PackageStatus>>,
}

impl StatusCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for a package.
    ///
    /// The outer `Option` is `None` on a miss; the inner one is `None` for a
    /// package known to be absent.
    pub fn get(&self, package: &str) -> Option<Option<&PackageStatus>> {
        self.entries.get(package).map(Option::as_ref)
    }

    /// Store a lookup result.
    pub fn insert(&mut self, package: &str, status: Option<PackageStatus>) {
        self.entries.insert(package.to_string(), status);
    }

    /// Drop one entry.
    pub fn invalidate(&mut self, package: &str) -> bool {
        self.entries.remove(package).is_some()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Look up a package through the cache.
///
/// Errors are not cached.
pub fn lookup_status(
    db: &dyn PackageDb,
    cache: &mut StatusCache,
    package: &PackageName,
) -> Result<Option<PackageStatus>, PackageDbError> {
    if let Some(cached) = cache.get(package.as_str()) {
        return Ok(cached.cloned());
    }

    let status = db.status(package)?;
    cache.insert(package.as_str(), status.clone());
    Ok(status)
}
