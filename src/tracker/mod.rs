//! tracker
//!
//! Queries for reports already filed against a package.
//!
//! # Architecture
//!
//! The [`Tracker`] trait is async because a real tracker answers over the
//! network. A query failure never stops a report: the session prints a
//! warning and carries on as if nothing was found.
//!
//! # Modules
//!
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```
//! use bugsmith::core::types::PackageName;
//! use bugsmith::tracker::{OfflineTracker, Tracker};
//!
//! # tokio_test::block_on(async {
//! let tracker = OfflineTracker;
//! let pkg = PackageName::new("reportbug").unwrap();
//! assert!(tracker.open_reports(&pkg).await.unwrap().is_empty());
//! # });
//! ```

pub mod mock;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{BugNumber, PackageName, Severity};

/// Errors from tracker queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The tracker answered with something unexpected.
    #[error("unexpected tracker response: {0}")]
    BadResponse(String),
}

/// One report filed against a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugSummary {
    /// Bug number
    pub number: BugNumber,
    /// Report subject
    pub subject: String,
    /// Current severity
    pub severity: Severity,
    /// Whether the report has been closed
    pub done: bool,
}

impl fmt::Display for BugSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}] {}", self.number, self.severity, self.subject)?;
        if self.done {
            write!(f, " (resolved)")?;
        }
        Ok(())
    }
}

/// A bug tracker that can list reports.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Reports filed against `package`, open and recently closed.
    async fn open_reports(&self, package: &PackageName) -> Result<Vec<BugSummary>, TrackerError>;
}

/// Tracker used without network access. It never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTracker;

#[async_trait]
impl Tracker for OfflineTracker {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn open_reports(&self, _package: &PackageName) -> Result<Vec<BugSummary>, TrackerError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_display() {
        let bug = BugSummary {
            number: BugNumber::new(1234).unwrap(),
            subject: "crashes on start".into(),
            severity: Severity::Grave,
            done: true,
        };
        assert_eq!(bug.to_string(), "#1234 [grave] crashes on start (resolved)");
    }
}
