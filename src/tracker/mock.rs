//! tracker::mock
//!
//! Mock tracker with canned reports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BugSummary, Tracker, TrackerError};
use crate::core::types::PackageName;

/// Mock tracker.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockTracker {
    inner: Arc<Mutex<MockTrackerInner>>,
}

#[derive(Debug, Default)]
struct MockTrackerInner {
    reports: HashMap<String, Vec<BugSummary>>,
    fail_with: Option<TrackerError>,
    queries: Vec<String>,
}

impl MockTracker {
    /// Create a tracker with no reports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a report against a package.
    pub fn with_report(self, package: &str, report: BugSummary) -> Self {
        self.inner
            .lock()
            .unwrap()
            .reports
            .entry(package.to_string())
            .or_default()
            .push(report);
        self
    }

    /// Fail every query with the given error.
    pub fn fail_with(self, error: TrackerError) -> Self {
        self.inner.lock().unwrap().fail_with = Some(error);
        self
    }

    /// Packages queried so far.
    pub fn queries(&self) -> Vec<String> {
        self.inner.lock().unwrap().queries.clone()
    }
}

#[async_trait]
impl Tracker for MockTracker {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn open_reports(&self, package: &PackageName) -> Result<Vec<BugSummary>, TrackerError> {
        let mut inner = self.inner.lock().unwrap();
        inner.queries.push(package.to_string());

        if let Some(err) = &inner.fail_with {
            return Err(err.clone());
        }
        Ok(inner.reports.get(package.as_str()).cloned().unwrap_or_default())
    }
}
