//! core::systems
//!
//! Bug tracking systems reports can be sent to.
//!
//! # Built-ins
//!
//! - `debian`: debbugs at `bugs.debian.org`, with a table of
//!   pseudo-packages that are not installable packages.
//! - `ubuntu`: reports go to a mailing list through a `mailto:` handler.
//! - `guug`: debbugs at `bugs.guug.de`, without local package lookup.
//!
//! More systems (for example a gnats tracker) can be declared in the
//! `[systems.<name>]` table of the configuration file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dialect::Dialect;
use super::types::SendTo;

/// How a system accepts reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemKind {
    /// Reports are mailed to a submission address
    #[default]
    Debbugs,
    /// Reports can only be composed through a `mailto:` URI
    Mailto,
}

/// A bug tracking system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSystem {
    /// Short name used on the command line and in config
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Submission address; `%s` is replaced with the local part
    pub email_template: String,
    /// Pseudo-header dialect
    pub dialect: Dialect,
    /// Pseudo-packages and their descriptions
    pub pseudo_packages: BTreeMap<String, String>,
    /// Whether installed package status is looked up
    pub query_dpkg: bool,
    /// How reports are accepted
    pub kind: SystemKind,
}

/// A tracker declared in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomSystem {
    /// Display label (defaults to the table name)
    pub label: Option<String>,
    /// Submission address, `%s` replaced with the local part
    pub email: String,
    /// Pseudo-header dialect
    pub dialect: Dialect,
    /// Whether to look up installed packages
    pub query_dpkg: Option<bool>,
}

const DEBIAN_PSEUDO_PACKAGES: &[(&str, &str)] = &[
    ("bugs.debian.org", "The bug tracking system, @bugs.debian.org"),
    ("buildd.debian.org", "Problems and requests related to the Debian Buildds"),
    ("cdimage.debian.org", "CD Image issues"),
    ("cdrom", "Installation system"),
    ("cloud.debian.org", "Issues involving Debian images for public/private clouds"),
    ("d-i.debian.org", "Issues regarding the d-i.debian.org service and general Debian Installer tasks"),
    ("debian-i18n", "Requests regarding Internationalization (i18n) of the distribution"),
    ("debian-live", "General problems with Debian Live systems"),
    ("ftp.debian.org", "Problems with the FTP site and Package removal requests"),
    ("general", "General problems (e.g. \"many manpages are mode 755\")"),
    ("installation-reports", "Reports of installation problems with stable & testing"),
    ("lists.debian.org", "The mailing lists, debian-*@lists.debian.org"),
    ("mirrors", "Problems with the official mirrors"),
    ("nm.debian.org", "New Member process and nm.debian.org webpages"),
    ("press", "Press release issues"),
    ("project", "Problems related to project administration"),
    ("qa.debian.org", "The Quality Assurance group"),
    ("release.debian.org", "Requests regarding Debian releases and release team tools"),
    ("release-notes", "Problems with the Release Notes"),
    ("security-tracker", "The Debian Security Bug Tracker"),
    ("security.debian.org", "The Debian Security Team"),
    ("snapshot.debian.org", "Issues with the snapshot.debian.org service"),
    ("spam", "Spam (reassign spam to here so we can complain about it)"),
    ("sponsorship-requests", "Requests for package review and sponsorship"),
    ("tech-ctte", "The Debian Technical Committee (see the Constitution)"),
    ("tracker.debian.org", "Issues with the Debian Package Tracker"),
    ("upgrade-reports", "Reports of upgrade problems for stable & testing"),
    ("wiki.debian.org", "Problems with the Debian wiki"),
    ("wnpp", "Work-Needing and Prospective Packages list"),
    ("www.debian.org", "Problems with the WWW site"),
];

impl TrackerSystem {
    /// The Debian bug tracking system.
    pub fn debian() -> Self {
        Self {
            name: "debian".into(),
            label: "Debian".into(),
            email_template: "%s@bugs.debian.org".into(),
            dialect: Dialect::Debbugs,
            pseudo_packages: DEBIAN_PSEUDO_PACKAGES
                .iter()
                .map(|(name, desc)| (name.to_string(), desc.to_string()))
                .collect(),
            query_dpkg: true,
            kind: SystemKind::Debbugs,
        }
    }

    /// Ubuntu, which takes reports through its users list.
    pub fn ubuntu() -> Self {
        Self {
            name: "ubuntu".into(),
            label: "Ubuntu".into(),
            email_template: "ubuntu-users@lists.ubuntu.com".into(),
            dialect: Dialect::Debbugs,
            pseudo_packages: BTreeMap::new(),
            query_dpkg: true,
            kind: SystemKind::Mailto,
        }
    }

    /// The German Unix User Group tracker.
    pub fn guug() -> Self {
        Self {
            name: "guug".into(),
            label: "GUUG (German Unix User Group)".into(),
            email_template: "%s@bugs.guug.de".into(),
            dialect: Dialect::Debbugs,
            pseudo_packages: BTreeMap::new(),
            query_dpkg: false,
            kind: SystemKind::Debbugs,
        }
    }

    /// All built-in systems.
    pub fn builtin() -> Vec<TrackerSystem> {
        vec![Self::debian(), Self::ubuntu(), Self::guug()]
    }

    /// Build a system from a configuration table.
    pub fn from_custom(name: &str, custom: &CustomSystem) -> Self {
        Self {
            name: name.to_string(),
            label: custom.label.clone().unwrap_or_else(|| name.to_string()),
            email_template: custom.email.clone(),
            dialect: custom.dialect,
            pseudo_packages: BTreeMap::new(),
            query_dpkg: custom.query_dpkg.unwrap_or(false),
            kind: SystemKind::Debbugs,
        }
    }

    /// Find a system by name, checking configured systems first.
    pub fn lookup(name: &str, custom: &BTreeMap<String, CustomSystem>) -> Option<TrackerSystem> {
        if let Some(system) = custom.get(name) {
            return Some(Self::from_custom(name, system));
        }
        Self::builtin().into_iter().find(|s| s.name == name)
    }

    /// Address reports are submitted to.
    ///
    /// # Example
    ///
    /// ```
    /// use bugsmith::core::systems::TrackerSystem;
    /// use bugsmith::core::types::SendTo;
    ///
    /// let debian = TrackerSystem::debian();
    /// assert_eq!(debian.submission_address(SendTo::Quiet), "quiet@bugs.debian.org");
    /// ```
    pub fn submission_address(&self, send_to: SendTo) -> String {
        self.email_template.replace("%s", send_to.local_part())
    }

    /// Address of an existing bug, for follow-ups.
    pub fn bug_address(&self, bug: u64) -> String {
        self.email_template.replace("%s", &bug.to_string())
    }

    /// Whether a package name is a pseudo-package on this system.
    pub fn is_pseudo_package(&self, package: &str) -> bool {
        self.pseudo_packages.contains_key(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debian_knows_wnpp() {
        let debian = TrackerSystem::debian();
        assert!(debian.is_pseudo_package("wnpp"));
        assert!(!debian.is_pseudo_package("reportbug"));
    }

    #[test]
    fn submission_address_substitutes_local_part() {
        let guug = TrackerSystem::guug();
        assert_eq!(guug.submission_address(SendTo::Submit), "submit@bugs.guug.de");
        assert_eq!(TrackerSystem::debian().bug_address(123), "123@bugs.debian.org");
    }

    #[test]
    fn mailto_system_address_is_fixed() {
        let ubuntu = TrackerSystem::ubuntu();
        assert_eq!(ubuntu.kind, SystemKind::Mailto);
        assert_eq!(
            ubuntu.submission_address(SendTo::Maintonly),
            "ubuntu-users@lists.ubuntu.com"
        );
    }

    #[test]
    fn lookup_prefers_configured_systems() {
        let mut custom = BTreeMap::new();
        custom.insert(
            "debian".to_string(),
            CustomSystem {
                email: "%s@bugs.example.org".into(),
                ..Default::default()
            },
        );
        custom.insert(
            "acme".to_string(),
            CustomSystem {
                label: Some("ACME GNATS".into()),
                email: "bugs@acme.example".into(),
                dialect: Dialect::Gnats,
                query_dpkg: None,
            },
        );

        let debian = TrackerSystem::lookup("debian", &custom).unwrap();
        assert_eq!(debian.email_template, "%s@bugs.example.org");

        let acme = TrackerSystem::lookup("acme", &custom).unwrap();
        assert_eq!(acme.dialect, Dialect::Gnats);
        assert_eq!(acme.label, "ACME GNATS");
        assert!(!acme.query_dpkg);

        assert!(TrackerSystem::lookup("guug", &custom).is_some());
        assert!(TrackerSystem::lookup("nowhere", &custom).is_none());
    }
}
