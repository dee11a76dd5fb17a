//! core::control
//!
//! Per-package bug reporting hooks shipped under `/usr/share/bug`.
//!
//! A package may install either a single executable `/usr/share/bug/<pkg>`
//! (the bug script) or a directory holding `control` and `script` files.
//!
//! # Control file format
//!
//! ```text
//! Submit-As: other-package
//! Send-To: other-bugs@example.org
//! Report-With: libfoo1 foo-data
//! Package-Status: foo-doc
//! ```
//!
//! Keys are case-insensitive. `Report-With` and `Package-Status` hold
//! space-separated package lists and accumulate across lines. Lines that
//! are not split into exactly two parts by `": "` are skipped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default root of the per-package hook tree.
pub const DEFAULT_BUG_DIR: &str = "/usr/share/bug";

/// Parsed bug control file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFile {
    /// Package to file the report against instead
    pub submit_as: Option<String>,
    /// Address to send the report to instead of the tracker
    pub send_to: Option<String>,
    /// Packages whose versions belong in the report
    pub report_with: Vec<String>,
    /// Packages whose installation status belongs in the report
    pub package_status: Vec<String>,
}

impl ControlFile {
    /// Parse control file text.
    ///
    /// # Example
    ///
    /// ```
    /// use bugsmith::core::control::ControlFile;
    ///
    /// let control = ControlFile::parse("Submit-As: bar\nreport-with: a b\nReport-With: c\n");
    /// assert_eq!(control.submit_as.as_deref(), Some("bar"));
    /// assert_eq!(control.report_with, vec!["a", "b", "c"]);
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut control = ControlFile::default();

        for line in text.lines() {
            let parts: Vec<&str> = line.trim().split(": ").collect();
            let [key, value] = parts.as_slice() else {
                continue;
            };

            match key.to_ascii_lowercase().as_str() {
                "submit-as" => control.submit_as = Some(value.to_string()),
                "send-to" => control.send_to = Some(value.to_string()),
                "report-with" => control.report_with.extend(split_list(value)),
                "package-status" => control.package_status.extend(split_list(value)),
                _ => {}
            }
        }

        control
    }

    /// Read and parse a control file.
    pub fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value.split(' ').filter(|s| !s.is_empty()).map(str::to_string)
}

/// Hook files found for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugFiles {
    /// Control file, if present
    pub control: Option<PathBuf>,
    /// Bug script, if present
    pub script: Option<PathBuf>,
}

impl BugFiles {
    /// Locate the hook files for `package` under `root`.
    pub fn locate(root: &Path, package: &str) -> Self {
        let base = root.join(package);

        if base.is_file() {
            return Self {
                control: None,
                script: Some(base),
            };
        }

        if base.is_dir() {
            let control = base.join("control");
            let script = base.join("script");
            return Self {
                control: control.is_file().then_some(control),
                script: script.is_file().then_some(script),
            };
        }

        Self::default()
    }

    /// Read the control file if there is one.
    pub fn read_control(&self) -> io::Result<Option<ControlFile>> {
        self.control.as_deref().map(ControlFile::read).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_all_keys() {
        let control = ControlFile::parse(
            "Submit-As: foo\nSend-To: foo-bugs@example.org\nReport-With: libfoo1 foo-data\nPackage-Status: foo-doc\n",
        );
        assert_eq!(control.submit_as.as_deref(), Some("foo"));
        assert_eq!(control.send_to.as_deref(), Some("foo-bugs@example.org"));
        assert_eq!(control.report_with, vec!["libfoo1", "foo-data"]);
        assert_eq!(control.package_status, vec!["foo-doc"]);
    }

    #[test]
    fn malformed_lines_skipped() {
        let control = ControlFile::parse("Submit-As:bar\nnonsense\nSend-To: a: b\n");
        assert_eq!(control, ControlFile::default());
    }

    #[test]
    fn later_scalar_values_win() {
        let control = ControlFile::parse("Submit-As: one\nSUBMIT-AS: two\n");
        assert_eq!(control.submit_as.as_deref(), Some("two"));
    }

    #[test]
    fn locate_directory_layout() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("foo");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("control"), "Submit-As: bar\n").unwrap();

        let files = BugFiles::locate(root.path(), "foo");
        assert!(files.control.is_some());
        assert!(files.script.is_none());

        let control = files.read_control().unwrap().unwrap();
        assert_eq!(control.submit_as.as_deref(), Some("bar"));
    }

    #[test]
    fn locate_single_script() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("foo"), "#!/bin/sh\n").unwrap();

        let files = BugFiles::locate(root.path(), "foo");
        assert_eq!(files.script, Some(root.path().join("foo")));
        assert_eq!(files.read_control().unwrap(), None);
    }

    #[test]
    fn locate_missing_package() {
        let root = TempDir::new().unwrap();
        assert_eq!(BugFiles::locate(root.path(), "absent"), BugFiles::default());
    }
}
