//! requests
//!
//! Request types: how the first draft of a report is put together.
//!
//! # Architecture
//!
//! A [`DraftBuilder`] asks the reporter whatever its request type needs and
//! returns a [`DraftSeed`]: subject, severity, headers, pseudo-headers and
//! body text. The [`RequestRegistry`] maps package names that name a request
//! type (`wnpp`, `installation-reports`, `upgrade-reports`) to their
//! builders; every other package gets the standard builder.
//!
//! # Modules
//!
//! - `standard`: ordinary bug against a package
//! - `wnpp`: orphaning, adoption, help and packaging requests
//! - `installation`: installation reports
//! - `upgrade`: upgrade reports
//!
//! # Example
//!
//! ```
//! use bugsmith::requests::RequestRegistry;
//!
//! let registry = RequestRegistry::default();
//! assert_eq!(registry.builder_for("wnpp").name(), "wnpp");
//! assert_eq!(registry.builder_for("coreutils").name(), "standard");
//! ```

mod installation;
mod standard;
mod upgrade;
mod wnpp;

pub use installation::InstallationReport;
pub use standard::{available_tags, StandardRequest};
pub use upgrade::UpgradeReport;
pub use wnpp::WnppRequest;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::normalize::Header;
use crate::core::systems::TrackerSystem;
use crate::core::types::{Mode, PackageName, Severity};
use crate::pkgdb::PackageDb;
use crate::ui::prompts::{Interaction, PromptError};

/// Errors from draft builders.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// The reporter chose not to file the report.
    #[error("{0}")]
    Aborted(String),
}

/// Values fixed on the command line before any question is asked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presets {
    pub subject: Option<String>,
    pub severity: Option<Severity>,
    pub tags: Vec<String>,
}

/// What a builder knows about the report it is starting.
pub struct PackageContext<'a> {
    /// Package the report is filed against
    pub package: &'a PackageName,
    /// Target tracker
    pub system: &'a TrackerSystem,
    /// Installed package lookups
    pub db: &'a dyn PackageDb,
    /// Reporter address, `Name <email>`
    pub from: Option<&'a str>,
    /// Reporter experience level
    pub mode: Mode,
    /// Whether network checks are allowed
    pub online: bool,
    /// Command-line presets
    pub presets: &'a Presets,
}

/// Starting material for the report draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSeed {
    pub subject: String,
    pub severity: Option<Severity>,
    pub justification: Option<String>,
    pub tags: Vec<String>,
    /// Mail headers
    pub headers: Vec<Header>,
    /// Extra pseudo-header lines, `Name: value`
    pub pseudo_headers: Vec<String>,
    pub body: String,
    /// Whether existing reports should be listed first
    pub query_tracker: bool,
    /// Whether the reporter guide goes into the draft
    pub include_template: bool,
}

impl Default for DraftSeed {
    fn default() -> Self {
        Self {
            subject: String::new(),
            severity: None,
            justification: None,
            tags: Vec::new(),
            headers: Vec::new(),
            pseudo_headers: Vec::new(),
            body: String::new(),
            query_tracker: true,
            include_template: true,
        }
    }
}

/// Strategy producing a [`DraftSeed`] for one request type.
pub trait DraftBuilder {
    /// Request type tag.
    fn name(&self) -> &'static str;

    /// Ask what is needed and produce the seed.
    fn build(
        &self,
        ctx: &PackageContext<'_>,
        ui: &mut dyn Interaction,
    ) -> Result<DraftSeed, RequestError>;
}

/// Request type tag to builder.
pub struct RequestRegistry {
    builders: BTreeMap<&'static str, Box<dyn DraftBuilder>>,
    standard: Box<dyn DraftBuilder>,
}

impl RequestRegistry {
    /// Registry with only the standard builder.
    pub fn new() -> Self {
        Self {
            builders: BTreeMap::new(),
            standard: Box::new(StandardRequest),
        }
    }

    /// Add or replace a builder under its own name.
    pub fn register(&mut self, builder: Box<dyn DraftBuilder>) {
        self.builders.insert(builder.name(), builder);
    }

    /// Builder for a package name.
    pub fn builder_for(&self, package: &str) -> &dyn DraftBuilder {
        self.builders
            .get(package)
            .map(Box::as_ref)
            .unwrap_or(self.standard.as_ref())
    }

    /// Registered special tags.
    pub fn tags(&self) -> Vec<&'static str> {
        self.builders.keys().copied().collect()
    }
}

impl Default for RequestRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(WnppRequest));
        registry.register(Box::new(InstallationReport));
        registry.register(Box::new(UpgradeReport));
        registry
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::pkgdb::mock::MockPackageDb;

    /// Owned pieces a [`PackageContext`] borrows from.
    pub struct Fixture {
        pub package: PackageName,
        pub system: TrackerSystem,
        pub db: MockPackageDb,
        pub presets: Presets,
        pub mode: Mode,
    }

    impl Fixture {
        pub fn new(package: &str) -> Self {
            Self {
                package: PackageName::new(package).unwrap(),
                system: TrackerSystem::debian(),
                db: MockPackageDb::new(),
                presets: Presets::default(),
                mode: Mode::Standard,
            }
        }

        pub fn ctx(&self) -> PackageContext<'_> {
            PackageContext {
                package: &self.package,
                system: &self.system,
                db: &self.db,
                from: Some("Jane Doe <jane@example.org>"),
                mode: self.mode,
                online: false,
                presets: &self.presets,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = RequestRegistry::default();
        assert_eq!(
            registry.tags(),
            vec!["installation-reports", "upgrade-reports", "wnpp"]
        );
        assert_eq!(registry.builder_for("upgrade-reports").name(), "upgrade-reports");
    }

    #[test]
    fn empty_registry_falls_back_to_standard() {
        let registry = RequestRegistry::new();
        assert_eq!(registry.builder_for("wnpp").name(), "standard");
    }
}
