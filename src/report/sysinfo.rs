//! report::sysinfo
//!
//! System information appended to reports.
//!
//! # Format
//!
//! ```text
//! -- System Information:
//! Debian Release: 12.5
//! Architecture: amd64 (x86_64)
//!
//! Kernel: Linux 6.1.0-18-amd64
//! Locale: LANG=C.UTF-8, LC_CTYPE=C.UTF-8
//! Init: systemd (via /run/systemd/system)
//! ```
//!
//! Dependency sections list each related package with a dpkg-style status
//! (`ii` installed, `rc` configuration files only, `pn` absent) and its
//! version.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::core::types::PackageName;
use crate::pkgdb::{lookup_status, PackageDb, PackageStatus, StatusCache};

/// Lines longer than this are clipped in dependency listings.
const DEPENDENCY_WIDTH: usize = 73;

/// Facts about the reporting system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemInfo {
    /// Distribution release, e.g. `12.5` or `trixie/sid`
    pub release: Option<String>,
    /// Package architecture
    pub architecture: String,
    /// Machine type when it differs from the package architecture
    pub machine: Option<String>,
    /// Kernel name and release
    pub kernel: String,
    /// Locale summary
    pub locale: String,
    /// Init system
    pub init: Option<String>,
}

impl SystemInfo {
    /// Gather information about the running system.
    pub fn gather() -> Self {
        let machine = std::env::consts::ARCH.to_string();
        let architecture = command_output("dpkg", &["--print-architecture"]).unwrap_or_else(|| machine.clone());
        let machine = (machine != architecture).then_some(machine);

        let kernel = match read_trimmed("/proc/sys/kernel/osrelease") {
            Some(release) => format!("{} {}", kernel_name(), release),
            None => kernel_name().to_string(),
        };

        Self {
            release: read_trimmed("/etc/debian_version"),
            architecture,
            machine,
            kernel,
            locale: locale_summary(|key| std::env::var(key).ok()),
            init: detect_init(Path::new("/")),
        }
    }

    /// Render the `-- System Information:` section.
    pub fn render(&self) -> String {
        let mut out = String::from("-- System Information:\n");
        if let Some(release) = &self.release {
            out.push_str(&format!("Debian Release: {}\n", release));
        }
        match &self.machine {
            Some(machine) => out.push_str(&format!("Architecture: {} ({})\n", self.architecture, machine)),
            None => out.push_str(&format!("Architecture: {}\n", self.architecture)),
        }
        out.push('\n');
        out.push_str(&format!("Kernel: {}\n", self.kernel));
        out.push_str(&format!("Locale: {}\n", self.locale));
        if let Some(init) = &self.init {
            out.push_str(&format!("Init: {}\n", init));
        }
        out
    }
}

fn kernel_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "freebsd" => "kFreeBSD",
        other => other,
    }
}

fn read_trimmed(path: impl AsRef<Path>) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Summarize `LANG` and `LC_CTYPE`, noting when `LC_ALL` overrides them.
///
/// # Example
///
/// ```
/// use bugsmith::report::sysinfo::locale_summary;
///
/// let env = |key: &str| match key {
///     "LANG" => Some("en_US.UTF-8".to_string()),
///     _ => None,
/// };
/// assert_eq!(locale_summary(env), "LANG=en_US.UTF-8, LC_CTYPE=en_US.UTF-8");
/// ```
pub fn locale_summary<F>(env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let lang = env("LANG").unwrap_or_else(|| "C".to_string());
    let all = env("LC_ALL").filter(|s| !s.is_empty());
    let ctype = env("LC_CTYPE").unwrap_or_else(|| lang.clone());

    let describe = |value: &str| match &all {
        Some(all) => format!("{} (ignored: LC_ALL set to {})", value, all),
        None => value.to_string(),
    };
    format!("LANG={}, LC_CTYPE={}", describe(&lang), describe(&ctype))
}

/// Detect the init system below `root`.
pub fn detect_init(root: &Path) -> Option<String> {
    if root.join("run/systemd/system").is_dir() {
        return Some("systemd (via /run/systemd/system)".to_string());
    }
    if root.join("run/openrc").is_dir() {
        return Some("OpenRC (via /run/openrc)".to_string());
    }
    read_trimmed(root.join("proc/1/comm")).map(|comm| format!("unable to detect ({})", comm))
}

/// Two-letter dpkg-style status of a package.
fn status_code(status: Option<&PackageStatus>) -> &'static str {
    match status {
        Some(s) if s.installed => "ii",
        Some(s) if s.state == "config-files" => "rc",
        _ => "pn",
    }
}

fn relation_section(
    db: &dyn PackageDb,
    cache: &mut StatusCache,
    package: &str,
    relation: &str,
    groups: &[Vec<String>],
) -> String {
    if groups.is_empty() {
        return format!("\n{} {} no packages.\n", package, relation);
    }

    // name -> (code, version); installed entries win over absent ones
    let mut rows: Vec<(String, &'static str, String)> = Vec::new();
    for group in groups {
        for alternative in group {
            let status = PackageName::new(alternative.as_str())
                .ok()
                .and_then(|name| lookup_status(db, cache, &name).ok().flatten());
            let code = status_code(status.as_ref());
            let version = status
                .as_ref()
                .filter(|s| s.installed)
                .map(|s| s.version.clone())
                .unwrap_or_else(|| "<none>".to_string());

            match rows.iter_mut().find(|(name, _, _)| name == alternative) {
                Some(row) if row.1 != "ii" && code == "ii" => {
                    row.1 = code;
                    row.2 = version;
                }
                Some(_) => {}
                None => rows.push((alternative.clone(), code, version)),
            }
        }
    }
    rows.sort();

    let max_name = rows.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0);
    let max_version = rows.iter().map(|(_, _, v)| v.len()).max().unwrap_or(0);
    let name_width = max_name.min(DEPENDENCY_WIDTH.saturating_sub(max_version));
    let version_width = max_version.min(DEPENDENCY_WIDTH.saturating_sub(name_width));

    let mut out = format!("\nVersions of packages {} {}:\n", package, relation);
    for (name, code, version) in &rows {
        let line = format!(
            "{:<3.3} {:<nw$.nw$}  {:<vw$.vw$}",
            code,
            name,
            version,
            nw = name_width,
            vw = version_width
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Render the dependency, recommendation and suggestion sections for a
/// package.
pub fn dependency_section(db: &dyn PackageDb, cache: &mut StatusCache, status: &PackageStatus) -> String {
    let package = status.package.as_str();
    let mut out = relation_section(db, cache, package, "depends on", &status.depends);
    if !status.recommends.is_empty() {
        out.push_str(&relation_section(db, cache, package, "recommends", &status.recommends));
    }
    if !status.suggests.is_empty() {
        out.push_str(&relation_section(db, cache, package, "suggests", &status.suggests));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkgdb::mock::MockPackageDb;
    use tempfile::TempDir;

    fn group(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renders_system_information() {
        let info = SystemInfo {
            release: Some("12.5".into()),
            architecture: "amd64".into(),
            machine: Some("x86_64".into()),
            kernel: "Linux 6.1.0-18-amd64".into(),
            locale: "LANG=C.UTF-8, LC_CTYPE=C.UTF-8".into(),
            init: None,
        };
        assert_eq!(
            info.render(),
            "-- System Information:\nDebian Release: 12.5\nArchitecture: amd64 (x86_64)\n\nKernel: Linux 6.1.0-18-amd64\nLocale: LANG=C.UTF-8, LC_CTYPE=C.UTF-8\n"
        );
    }

    #[test]
    fn locale_notes_lc_all_override() {
        let env = |key: &str| match key {
            "LANG" => Some("de_DE.UTF-8".to_string()),
            "LC_ALL" => Some("C".to_string()),
            _ => None,
        };
        assert_eq!(
            locale_summary(env),
            "LANG=de_DE.UTF-8 (ignored: LC_ALL set to C), LC_CTYPE=de_DE.UTF-8 (ignored: LC_ALL set to C)"
        );
    }

    #[test]
    fn locale_defaults_to_c() {
        assert_eq!(locale_summary(|_| None), "LANG=C, LC_CTYPE=C");
    }

    #[test]
    fn init_detection() {
        let dir = TempDir::new().unwrap();
        assert_eq!(detect_init(dir.path()), None);

        fs::create_dir_all(dir.path().join("proc/1")).unwrap();
        fs::write(dir.path().join("proc/1/comm"), "runit\n").unwrap();
        assert_eq!(detect_init(dir.path()).as_deref(), Some("unable to detect (runit)"));

        fs::create_dir_all(dir.path().join("run/systemd/system")).unwrap();
        assert_eq!(
            detect_init(dir.path()).as_deref(),
            Some("systemd (via /run/systemd/system)")
        );
    }

    #[test]
    fn dependency_listing() {
        let db = MockPackageDb::new()
            .with_installed("libc6", "2.36-9+deb12u4")
            .with_installed("python3", "3.11.2-1+b1");
        let mut cache = StatusCache::new();
        let status = PackageStatus {
            package: "reportbug".into(),
            depends: vec![group(&["python3"]), group(&["libc6"])],
            suggests: vec![group(&["mutt", "neomutt"])],
            ..Default::default()
        };

        let text = dependency_section(&db, &mut cache, &status);

        assert_eq!(
            text,
            "\nVersions of packages reportbug depends on:\n\
ii  libc6    2.36-9+deb12u4\n\
ii  python3  3.11.2-1+b1\n\
\nVersions of packages reportbug suggests:\n\
pn  mutt     <none>\n\
pn  neomutt  <none>\n"
        );
    }

    #[test]
    fn no_dependencies() {
        let db = MockPackageDb::new();
        let mut cache = StatusCache::new();
        let status = PackageStatus {
            package: "tzdata".into(),
            ..Default::default()
        };
        assert_eq!(
            dependency_section(&db, &mut cache, &status),
            "\ntzdata depends on no packages.\n"
        );
    }
}
