//! pkgdb
//!
//! Installed package information.
//!
//! # Architecture
//!
//! The [`PackageDb`] trait abstracts the package database. The real
//! implementation, [`DpkgDatabase`], reads the dpkg status file. Lookups go
//! through a [`StatusCache`] owned by the caller, so one report session
//! parses each package at most once.
//!
//! # Modules
//!
//! - `dpkg`: dpkg status file reader and stanza parser
//! - `cache`: explicit lookup cache
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use bugsmith::core::types::PackageName;
//! use bugsmith::pkgdb::{lookup_status, DpkgDatabase, StatusCache};
//!
//! let db = DpkgDatabase::new();
//! let mut cache = StatusCache::new();
//! let pkg = PackageName::new("reportbug").unwrap();
//!
//! if let Some(status) = lookup_status(&db, &mut cache, &pkg).unwrap() {
//!     println!("{} {}", status.package, status.version);
//! }
//! ```

mod cache;
mod dpkg;
pub mod mock;

pub use cache::{lookup_status, StatusCache};
pub use dpkg::{parse_stanza, DpkgDatabase, DEFAULT_STATUS_PATH};

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::types::PackageName;

/// Errors from package database access.
#[derive(Debug, Error)]
pub enum PackageDbError {
    #[error("failed to read package database '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("package database unavailable: {0}")]
    Unavailable(String),
}

/// Installation state and metadata of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageStatus {
    /// Binary package name
    pub package: String,
    /// Installed version
    pub version: String,
    /// Maintainer field
    pub maintainer: Option<String>,
    /// Short description
    pub description: Option<String>,
    /// Extended description lines, leading space removed
    pub long_description: Vec<String>,
    /// Depends and Pre-Depends as alternative groups, versions stripped
    pub depends: Vec<Vec<String>>,
    /// Recommends as alternative groups
    pub recommends: Vec<Vec<String>>,
    /// Suggests as alternative groups
    pub suggests: Vec<Vec<String>>,
    /// Configuration files with their md5sums
    pub conffiles: Vec<(String, String)>,
    /// Source package name, when it differs from the binary
    pub source: Option<String>,
    /// Archive section
    pub section: Option<String>,
    /// Priority
    pub priority: Option<String>,
    /// Origin (vendor)
    pub origin: Option<String>,
    /// Bugs field (alternative tracker URL)
    pub bugs: Option<String>,
    /// Third word of the Status field, e.g. `installed`
    pub state: String,
    /// Whether the package is installed (not just configuration files)
    pub installed: bool,
}

impl PackageStatus {
    /// Source package name, falling back to the binary name.
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.package)
    }
}

/// Read access to the package database.
pub trait PackageDb {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Look up a package. `Ok(None)` means the package is unknown.
    fn status(&self, package: &PackageName) -> Result<Option<PackageStatus>, PackageDbError>;
}
