//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`PackageName`] - Validated package name
//! - [`Severity`] - Bug severity, convertible between dialects
//! - [`Mode`] - Reporter experience level
//! - [`BugNumber`] - Tracker bug number
//! - [`SendTo`] - Submission address local part
//! - [`Fingerprint`] - Content hash of a draft
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use bugsmith::core::types::{BugNumber, PackageName, Severity};
//!
//! let pkg = PackageName::new("reportbug").unwrap();
//! assert_eq!(pkg.as_str(), "reportbug");
//! assert!(PackageName::new("Foo").is_err());
//!
//! let bug: BugNumber = "#123456".parse().unwrap();
//! assert_eq!(bug.get(), 123456);
//!
//! let sev: Severity = "grave".parse().unwrap();
//! assert!(sev.is_release_critical());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::dialect::Dialect;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("unknown mode '{0}', must be one of: novice, standard, advanced, expert")]
    UnknownMode(String),

    #[error("invalid bug number: {0}")]
    InvalidBugNumber(String),

    #[error("unknown submission target '{0}', must be one of: submit, quiet, maintonly")]
    UnknownSendTo(String),
}

/// A validated package name.
///
/// Package names are lowercase, at least two characters long, start with
/// a letter or digit and otherwise contain only letters, digits, `+`, `-`
/// and `.`.
///
/// # Example
///
/// ```
/// use bugsmith::core::types::PackageName;
///
/// assert!(PackageName::new("libc6").is_ok());
/// assert!(PackageName::new("g++-12").is_ok());
/// assert!(PackageName::new("release.debian.org").is_ok());
///
/// assert!(PackageName::new("x").is_err());
/// assert!(PackageName::new("-flag").is_err());
/// assert!(PackageName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Create a new validated package name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPackageName` if the name is malformed.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let mut chars = name.chars();
        let first = chars
            .next()
            .ok_or_else(|| TypeError::InvalidPackageName("package name cannot be empty".into()))?;

        if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
            return Err(TypeError::InvalidPackageName(format!(
                "'{name}' must start with a lowercase letter or digit"
            )));
        }

        if name.len() < 2 {
            return Err(TypeError::InvalidPackageName(format!(
                "'{name}' is too short"
            )));
        }

        if let Some(c) = chars.find(|c| {
            !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
        }) {
            return Err(TypeError::InvalidPackageName(format!(
                "'{name}' contains invalid character '{c}'"
            )));
        }

        Ok(())
    }

    /// Get the package name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackageName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PackageName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bug severity.
///
/// debbugs trackers use the full list; gnats trackers know only
/// `critical`, `serious` and `non-critical`. Use [`Severity::convert`] to
/// map a severity onto a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Critical,
    Grave,
    Serious,
    Important,
    DoesNotBuild,
    #[default]
    Normal,
    NonCritical,
    Minor,
    Wishlist,
}

const DEBBUGS_SEVERITIES: &[Severity] = &[
    Severity::Critical,
    Severity::Grave,
    Severity::Serious,
    Severity::Important,
    Severity::DoesNotBuild,
    Severity::Normal,
    Severity::Minor,
    Severity::Wishlist,
];

const GNATS_SEVERITIES: &[Severity] = &[
    Severity::Critical,
    Severity::Serious,
    Severity::NonCritical,
];

const CRITICAL_JUSTIFICATIONS: &[(&str, &str)] = &[
    (
        "breaks unrelated software",
        "breaks unrelated software on the system (packages that have a dependency relationship are not unrelated)",
    ),
    (
        "breaks the whole system",
        "renders the entire system unusable (e.g., unbootable, unable to reach a multiuser runlevel, etc.)",
    ),
    (
        "causes serious data loss",
        "causes loss of important, irreplaceable data",
    ),
    (
        "root security hole",
        "introduces a security hole allowing access to root (or another privileged system account), or data normally accessible only by such accounts",
    ),
    ("unknown", "not sure, or none of the above"),
];

const GRAVE_JUSTIFICATIONS: &[(&str, &str)] = &[
    (
        "renders package unusable",
        "renders the package unusable, or mostly so, on all or nearly all possible systems on which it could be installed; or renders package uninstallable or unremovable without special effort",
    ),
    (
        "causes non-serious data loss",
        "causes the loss of data on the system that is unimportant, or restorable without resorting to backup media",
    ),
    (
        "user security hole",
        "introduces a security hole allowing access to user accounts or data not normally accessible",
    ),
    ("unknown", "not sure, or none of the above"),
];

impl Severity {
    /// Severities offered for a dialect, most severe first.
    pub fn for_dialect(dialect: Dialect) -> &'static [Severity] {
        match dialect {
            Dialect::Debbugs => DEBBUGS_SEVERITIES,
            Dialect::Gnats => GNATS_SEVERITIES,
        }
    }

    /// Severity name as written in a report.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Grave => "grave",
            Severity::Serious => "serious",
            Severity::Important => "important",
            Severity::DoesNotBuild => "does-not-build",
            Severity::Normal => "normal",
            Severity::NonCritical => "non-critical",
            Severity::Minor => "minor",
            Severity::Wishlist => "wishlist",
        }
    }

    /// One-line description shown when choosing a severity.
    pub fn description(&self) -> &'static str {
        match self {
            Severity::Critical => "makes unrelated software on the system (or the whole system) break, or causes serious data loss, or introduces a security hole on systems where you install the package",
            Severity::Grave => "makes the package in question unusable by most or all users, or causes data loss, or introduces a security hole allowing access to the accounts of users who use the package",
            Severity::Serious => "is a severe violation of Debian policy (a violation of a 'must' or 'required' directive)",
            Severity::Important => "a bug which has a major effect on the usability of a package, without rendering it completely unusable to everyone",
            Severity::DoesNotBuild => "a bug that stops the package from being built from source (a 'virtual severity')",
            Severity::Normal => "a bug that does not undermine the usability of the whole package; for example, a problem with a particular option or menu item",
            Severity::NonCritical => "the product is working in general, but lacks features, has irritating behavior, does something wrong, or doesn't match its documentation",
            Severity::Minor => "things like spelling mistakes and other minor cosmetic errors that do not affect the core functionality of the package",
            Severity::Wishlist => "suggestions and requests for new features",
        }
    }

    /// Map this severity onto the names a dialect understands.
    ///
    /// # Example
    ///
    /// ```
    /// use bugsmith::core::dialect::Dialect;
    /// use bugsmith::core::types::Severity;
    ///
    /// assert_eq!(Severity::Grave.convert(Dialect::Gnats), Severity::Critical);
    /// assert_eq!(Severity::Minor.convert(Dialect::Gnats), Severity::NonCritical);
    /// assert_eq!(Severity::NonCritical.convert(Dialect::Debbugs), Severity::Normal);
    /// ```
    pub fn convert(self, dialect: Dialect) -> Severity {
        match dialect {
            Dialect::Debbugs => match self {
                Severity::NonCritical => Severity::Normal,
                other => other,
            },
            Dialect::Gnats => match self {
                Severity::Grave => Severity::Critical,
                Severity::Important => Severity::Serious,
                Severity::Normal | Severity::Minor | Severity::Wishlist => Severity::NonCritical,
                other => other,
            },
        }
    }

    /// Whether bugs of this severity block a release.
    pub fn is_release_critical(&self) -> bool {
        matches!(self, Severity::Critical | Severity::Grave | Severity::Serious)
    }

    /// Justification choices (name, description) for this severity.
    ///
    /// Empty for severities that need no justification.
    pub fn justifications(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Severity::Critical => CRITICAL_JUSTIFICATIONS,
            Severity::Grave => GRAVE_JUSTIFICATIONS,
            _ => &[],
        }
    }
}

impl FromStr for Severity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DEBBUGS_SEVERITIES
            .iter()
            .chain(GNATS_SEVERITIES)
            .find(|sev| sev.name() == lower)
            .copied()
            .ok_or_else(|| TypeError::UnknownSeverity(s.to_string()))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reporter experience level.
///
/// Levels are ordered: a check for `mode >= Mode::Advanced` enables the
/// advanced behaviors for both advanced and expert reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Novice,
    #[default]
    Standard,
    Advanced,
    Expert,
}

impl Mode {
    /// Mode name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Novice => "novice",
            Mode::Standard => "standard",
            Mode::Advanced => "advanced",
            Mode::Expert => "expert",
        }
    }
}

impl FromStr for Mode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "novice" => Ok(Mode::Novice),
            "standard" => Ok(Mode::Standard),
            "advanced" => Ok(Mode::Advanced),
            "expert" => Ok(Mode::Expert),
            _ => Err(TypeError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A tracker bug number.
///
/// # Example
///
/// ```
/// use bugsmith::core::types::BugNumber;
///
/// assert_eq!("42".parse::<BugNumber>().unwrap().to_string(), "42");
/// assert_eq!("#42".parse::<BugNumber>().unwrap().get(), 42);
/// assert!("0".parse::<BugNumber>().is_err());
/// assert!("abc".parse::<BugNumber>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct BugNumber(u64);

impl BugNumber {
    /// Create a bug number; zero is not a valid bug.
    pub fn new(number: u64) -> Result<Self, TypeError> {
        if number == 0 {
            return Err(TypeError::InvalidBugNumber("bug numbers start at 1".into()));
        }
        Ok(Self(number))
    }

    /// The numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for BugNumber {
    type Error = TypeError;

    fn try_from(n: u64) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<BugNumber> for u64 {
    fn from(bug: BugNumber) -> Self {
        bug.0
    }
}

impl FromStr for BugNumber {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        let number = digits
            .parse::<u64>()
            .map_err(|_| TypeError::InvalidBugNumber(s.to_string()))?;
        Self::new(number)
    }
}

impl fmt::Display for BugNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local part of the tracker submission address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendTo {
    /// Forward to the maintainer and the mailing list
    #[default]
    Submit,
    /// File the report without forwarding it
    Quiet,
    /// Forward to the maintainer only
    Maintonly,
}

impl SendTo {
    /// The address local part.
    pub fn local_part(&self) -> &'static str {
        match self {
            SendTo::Submit => "submit",
            SendTo::Quiet => "quiet",
            SendTo::Maintonly => "maintonly",
        }
    }
}

impl FromStr for SendTo {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "submit" => Ok(SendTo::Submit),
            "quiet" => Ok(SendTo::Quiet),
            "maintonly" => Ok(SendTo::Maintonly),
            _ => Err(TypeError::UnknownSendTo(s.to_string())),
        }
    }
}

impl fmt::Display for SendTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local_part())
    }
}

/// SHA-256 hash of draft text, used to tell whether an edit changed it.
///
/// # Example
///
/// ```
/// use bugsmith::core::types::Fingerprint;
///
/// let before = Fingerprint::compute("Subject: \n\nbody\n");
/// let after = Fingerprint::compute("Subject: crash\n\nbody\n");
/// assert_ne!(before, after);
/// assert_eq!(before, Fingerprint::compute("Subject: \n\nbody\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash the given text.
    pub fn compute(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
