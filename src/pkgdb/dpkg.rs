//! pkgdb::dpkg
//!
//! Reader for the dpkg status file.
//!
//! The file is a sequence of stanzas separated by blank lines. Each stanza
//! holds `Field: value` lines; lines starting with a space continue the
//! previous field.

use std::fs;
use std::path::{Path, PathBuf};

use super::{PackageDb, PackageDbError, PackageStatus};
use crate::core::naming::split_field;
use crate::core::types::PackageName;

/// Default location of the dpkg status file.
pub const DEFAULT_STATUS_PATH: &str = "/var/lib/dpkg/status";

/// Package database backed by a dpkg status file.
#[derive(Debug, Clone)]
pub struct DpkgDatabase {
    path: PathBuf,
}

impl DpkgDatabase {
    /// Database at the default status file location.
    pub fn new() -> Self {
        Self::with_path(DEFAULT_STATUS_PATH)
    }

    /// Database at a custom location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Status file this database reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DpkgDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageDb for DpkgDatabase {
    fn name(&self) -> &'static str {
        "dpkg"
    }

    fn status(&self, package: &PackageName) -> Result<Option<PackageStatus>, PackageDbError> {
        let bytes = fs::read(&self.path).map_err(|source| PackageDbError::Read {
            path: self.path.clone(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);

        let wanted = package.as_str();
        let found = stanzas(&text)
            .map(parse_stanza)
            .find(|status| status.package == wanted || status.package.split(':').next() == Some(wanted));
        Ok(found)
    }
}

/// Split status file text into stanzas.
fn stanzas(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n")
        .map(|s| s.trim_matches('\n'))
        .filter(|s| !s.trim().is_empty())
}

/// Split a relationship field into alternative groups, dropping version
/// constraints and architecture qualifiers.
fn parse_relations(value: &str) -> Vec<Vec<String>> {
    value
        .split(',')
        .map(|group| {
            group
                .split('|')
                .filter_map(|alt| alt.split_whitespace().next())
                .map(|name| name.split(':').next().unwrap_or(name).to_string())
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Parse one status stanza.
///
/// # Example
///
/// ```
/// use bugsmith::pkgdb::parse_stanza;
///
/// let status = parse_stanza(
///     "Package: foo\nStatus: install ok installed\nVersion: 1.0-1\nDepends: libc6 (>= 2.36), bar | baz\n",
/// );
/// assert!(status.installed);
/// assert_eq!(status.depends, vec![vec!["libc6"], vec!["bar", "baz"]]);
/// ```
pub fn parse_stanza(stanza: &str) -> PackageStatus {
    let mut status = PackageStatus::default();
    let mut current: Option<String> = None;

    for line in stanza.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            match current.as_deref() {
                Some("Description") => {
                    let text = line.strip_prefix(' ').unwrap_or(line);
                    status.long_description.push(text.to_string());
                }
                Some("Conffiles") => {
                    let mut parts = line.split_whitespace();
                    if let (Some(path), Some(sum)) = (parts.next(), parts.next()) {
                        status.conffiles.push((path.to_string(), sum.to_string()));
                    }
                }
                _ => {}
            }
            continue;
        }

        let Some((name, value)) = split_field(line) else {
            current = None;
            continue;
        };
        let value = value.trim_end();
        let owned = || Some(value.to_string());

        match name {
            "Package" => status.package = value.to_string(),
            "Version" => status.version = value.to_string(),
            "Status" => {
                status.state = value.split_whitespace().nth(2).unwrap_or_default().to_string();
                status.installed = !matches!(status.state.as_str(), "config-files" | "not-installed" | "");
            }
            "Maintainer" => status.maintainer = owned(),
            "Description" => status.description = owned(),
            "Depends" | "Pre-Depends" => status.depends.extend(parse_relations(value)),
            "Recommends" => status.recommends.extend(parse_relations(value)),
            "Suggests" => status.suggests.extend(parse_relations(value)),
            "Source" => status.source = value.split_whitespace().next().map(str::to_string),
            "Section" => status.section = owned(),
            "Priority" => status.priority = owned(),
            "Origin" => status.origin = owned(),
            "Bugs" => status.bugs = owned(),
            _ => {}
        }
        current = Some(name.to_string());
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STATUS: &str = "\
Package: reportbug
Status: install ok installed
Priority: standard
Section: utils
Maintainer: Reportbug Maintainers <debian-reportbug@lists.debian.org>
Architecture: all
Source: reportbug (13.0.1)
Version: 13.0.1
Depends: apt, python3:any, sensible-utils, python3-reportbug (= 13.0.1)
Suggests: claws-mail (>= 3.8.0), debsums (>= 2.0.47), dlocate, emacs-bin-common
Conffiles:
 /etc/reportbug.conf 3f3b0c1e2b2a1f4d5e6f7a8b9c0d1e2f
Description: reports bugs in the Debian distribution
 reportbug is a tool designed to make the reporting of bugs in Debian
 and derived distributions relatively painless.
 .
 Its features include integration with mutt.

Package: oldlib
Status: deinstall ok config-files
Version: 0.1-1
Description: removed library

Package: libfoo1:amd64
Status: install ok installed
Version: 2.0-3
";

    fn db() -> (TempDir, DpkgDatabase) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status");
        fs::write(&path, STATUS).unwrap();
        (dir, DpkgDatabase::with_path(path))
    }

    #[test]
    fn parses_full_stanza() {
        let (_dir, db) = db();
        let status = db
            .status(&PackageName::new("reportbug").unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(status.version, "13.0.1");
        assert!(status.installed);
        assert_eq!(status.state, "installed");
        assert_eq!(status.source.as_deref(), Some("reportbug"));
        assert_eq!(status.depends.len(), 4);
        assert_eq!(status.depends[1], vec!["python3"]);
        assert_eq!(status.suggests[0], vec!["claws-mail"]);
        assert_eq!(
            status.conffiles,
            vec![(
                "/etc/reportbug.conf".to_string(),
                "3f3b0c1e2b2a1f4d5e6f7a8b9c0d1e2f".to_string()
            )]
        );
        assert_eq!(status.long_description.len(), 4);
        assert_eq!(status.long_description[2], ".");
        assert_eq!(
            status.description.as_deref(),
            Some("reports bugs in the Debian distribution")
        );
    }

    #[test]
    fn config_files_only_is_not_installed() {
        let (_dir, db) = db();
        let status = db
            .status(&PackageName::new("oldlib").unwrap())
            .unwrap()
            .unwrap();
        assert!(!status.installed);
        assert_eq!(status.state, "config-files");
    }

    #[test]
    fn arch_qualified_name_matches() {
        let (_dir, db) = db();
        let status = db.status(&PackageName::new("libfoo1").unwrap()).unwrap();
        assert_eq!(status.map(|s| s.version).as_deref(), Some("2.0-3"));
    }

    #[test]
    fn unknown_package_is_none() {
        let (_dir, db) = db();
        assert!(db
            .status(&PackageName::new("absent").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_file_is_error() {
        let db = DpkgDatabase::with_path("/nonexistent/status");
        let result = db.status(&PackageName::new("foo1").unwrap());
        assert!(matches!(result, Err(PackageDbError::Read { .. })));
    }

    #[test]
    fn source_name_falls_back_to_package() {
        let status = parse_stanza("Package: bar\nVersion: 1\n");
        assert_eq!(status.source_name(), "bar");
    }
}
