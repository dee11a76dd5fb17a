//! pkgdb::mock
//!
//! In-memory package database for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{PackageDb, PackageDbError, PackageStatus};
use crate::core::types::PackageName;

/// Mock package database.
///
/// Clones share state, so a test can keep a handle and inspect the
/// recorded lookups after handing the database to a session.
#[derive(Debug, Clone, Default)]
pub struct MockPackageDb {
    inner: Arc<Mutex<MockDbInner>>,
}

#[derive(Debug, Default)]
struct MockDbInner {
    packages: HashMap<String, PackageStatus>,
    fail: bool,
    lookups: Vec<String>,
}

impl MockPackageDb {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package status.
    pub fn with_status(self, status: PackageStatus) -> Self {
        self.inner
            .lock()
            .unwrap()
            .packages
            .insert(status.package.clone(), status);
        self
    }

    /// Add an installed package with just a version.
    pub fn with_installed(self, package: &str, version: &str) -> Self {
        self.with_status(PackageStatus {
            package: package.to_string(),
            version: version.to_string(),
            state: "installed".to_string(),
            installed: true,
            ..Default::default()
        })
    }

    /// Make every lookup fail.
    pub fn failing(self) -> Self {
        self.inner.lock().unwrap().fail = true;
        self
    }

    /// Packages looked up so far.
    pub fn lookups(&self) -> Vec<String> {
        self.inner.lock().unwrap().lookups.clone()
    }
}

impl PackageDb for MockPackageDb {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn status(&self, package: &PackageName) -> Result<Option<PackageStatus>, PackageDbError> {
        let mut inner = self.inner.lock().unwrap();
        inner.lookups.push(package.to_string());
        if inner.fail {
            return Err(PackageDbError::Unavailable("mock failure".into()));
        }
        Ok(inner.packages.get(package.as_str()).cloned())
    }
}
