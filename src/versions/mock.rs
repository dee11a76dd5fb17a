//! versions::mock
//!
//! Mock version source for deterministic testing.
//!
//! # Example
//!
//! ```
//! use bugsmith::core::types::PackageName;
//! use bugsmith::versions::mock::MockVersionSource;
//! use bugsmith::versions::VersionSource;
//!
//! # tokio_test::block_on(async {
//! let source = MockVersionSource::new().with_version("reportbug", "unstable", "13.0");
//! let pkg = PackageName::new("reportbug").unwrap();
//!
//! let versions = source.available(&pkg, &["unstable".to_string()]).await.unwrap();
//! assert_eq!(versions["unstable"], "13.0");
//! assert_eq!(source.queries(), vec!["reportbug".to_string()]);
//! # });
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{VersionError, VersionSource};
use crate::core::types::PackageName;

/// Mock version source.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockVersionSource {
    inner: Arc<Mutex<MockVersionInner>>,
}

#[derive(Debug, Default)]
struct MockVersionInner {
    /// package -> dist -> version
    versions: HashMap<String, BTreeMap<String, String>>,
    /// Error returned for every query, if set
    fail_with: Option<VersionError>,
    /// Packages queried, in order
    queries: Vec<String>,
}

impl MockVersionSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version of a package in a distribution.
    pub fn with_version(self, package: &str, dist: &str, version: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .versions
            .entry(package.to_string())
            .or_default()
            .insert(dist.to_string(), version.to_string());
        self
    }

    /// Fail every query with the given error.
    pub fn fail_with(self, error: VersionError) -> Self {
        self.inner.lock().unwrap().fail_with = Some(error);
        self
    }

    /// Packages queried so far.
    pub fn queries(&self) -> Vec<String> {
        self.inner.lock().unwrap().queries.clone()
    }
}

#[async_trait]
impl VersionSource for MockVersionSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn available(
        &self,
        package: &PackageName,
        dists: &[String],
    ) -> Result<BTreeMap<String, String>, VersionError> {
        let mut inner = self.inner.lock().unwrap();
        inner.queries.push(package.to_string());

        if let Some(err) = &inner.fail_with {
            return Err(err.clone());
        }

        let versions = inner.versions.get(package.as_str()).cloned().unwrap_or_default();
        Ok(versions
            .into_iter()
            .filter(|(dist, _)| dists.is_empty() || dists.contains(dist))
            .collect())
    }
}
