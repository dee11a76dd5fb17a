//! core::dialect
//!
//! Pseudo-header vocabulary per tracker dialect.
//!
//! # Dialects
//!
//! - [`Dialect::Debbugs`]: structured fields are recognized by name. The
//!   vocabulary is a fixed priority list, and output follows that list.
//! - [`Dialect::Gnats`]: structured fields carry a `>` sigil. There is no
//!   static vocabulary, and output follows the order of appearance.
//!
//! # Field policies
//!
//! Every recognized field has a [`FieldPolicy`] that tells the reconciler
//! what to do with repeated occurrences.
//!
//! # Example
//!
//! ```
//! use bugsmith::core::dialect::{Dialect, FieldPolicy};
//!
//! let vocab = Dialect::Debbugs.accepted_names(["morph"]);
//! assert!(vocab.contains("Package"));
//! assert!(vocab.contains("Morph"));
//!
//! assert!(Dialect::Debbugs.is_repeatable("Control"));
//! assert_eq!(Dialect::Debbugs.policy("X-Debbugs-Cc"), FieldPolicy::Accumulate);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::naming::normalize_field_name;

/// Errors from dialect lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DialectError {
    #[error("unknown tracker dialect '{0}', must be one of: debbugs, gnats")]
    Unknown(String),
}

/// How repeated occurrences of one field are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The most recent occurrence replaces earlier ones.
    LastWins,
    /// Values are joined with `", "` in arrival order, skipping duplicates.
    Accumulate,
    /// Every occurrence is kept as its own line.
    Repeatable,
}

/// A statically registered pseudo-header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical field name
    pub name: &'static str,
    /// Reconciliation policy
    pub policy: FieldPolicy,
}

impl FieldSpec {
    const fn last_wins(name: &'static str) -> Self {
        Self {
            name,
            policy: FieldPolicy::LastWins,
        }
    }
}

/// debbugs fields in output priority order.
const DEBBUGS_FIELDS: &[FieldSpec] = &[
    FieldSpec::last_wins("Package"),
    FieldSpec::last_wins("Source"),
    FieldSpec::last_wins("Version"),
    FieldSpec::last_wins("Severity"),
    FieldSpec::last_wins("File"),
    FieldSpec::last_wins("Tags"),
    FieldSpec::last_wins("Justification"),
    FieldSpec::last_wins("Followup-For"),
    FieldSpec::last_wins("Owner"),
    FieldSpec::last_wins("User"),
    FieldSpec::last_wins("Usertags"),
    FieldSpec::last_wins("Forwarded"),
    FieldSpec {
        name: "Control",
        policy: FieldPolicy::Repeatable,
    },
    FieldSpec {
        name: "X-Debbugs-Cc",
        policy: FieldPolicy::Accumulate,
    },
];

/// How a dialect orders serialized pseudo-headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOrder {
    /// Vocabulary priority order, repeatable lines last
    Priority,
    /// Order of first appearance
    Appearance,
}

/// Tracker dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Debian-style debbugs trackers
    #[default]
    Debbugs,
    /// GNATS trackers
    Gnats,
}

impl Dialect {
    /// All dialects.
    pub fn all() -> &'static [Dialect] {
        &[Dialect::Debbugs, Dialect::Gnats]
    }

    /// Dialect name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Debbugs => "debbugs",
            Dialect::Gnats => "gnats",
        }
    }

    /// Prefix that marks a structured field, if the dialect uses one.
    pub fn sigil(&self) -> Option<char> {
        match self {
            Dialect::Debbugs => None,
            Dialect::Gnats => Some('>'),
        }
    }

    /// Statically registered fields in priority order.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Dialect::Debbugs => DEBBUGS_FIELDS,
            Dialect::Gnats => &[],
        }
    }

    /// Serialization order for this dialect.
    pub fn output_order(&self) -> OutputOrder {
        match self {
            Dialect::Debbugs => OutputOrder::Priority,
            Dialect::Gnats => OutputOrder::Appearance,
        }
    }

    /// Reconciliation policy for a field. Unregistered names are last-wins.
    pub fn policy(&self, name: &str) -> FieldPolicy {
        let name = normalize_field_name(name);
        self.fields()
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.policy)
            .unwrap_or(FieldPolicy::LastWins)
    }

    /// Whether a field may legally appear more than once.
    pub fn is_repeatable(&self, name: &str) -> bool {
        self.policy(name) == FieldPolicy::Repeatable
    }

    /// Build the accepted name set for one run.
    ///
    /// The static vocabulary comes first in priority order, followed by any
    /// supplemental names not already present, each normalized.
    pub fn accepted_names<I, S>(&self, supplemental: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = self
            .fields()
            .iter()
            .map(|spec| normalize_field_name(spec.name))
            .collect();

        for name in supplemental {
            let name = normalize_field_name(name.as_ref());
            if !names.contains(&name) {
                names.push(name);
            }
        }

        Vocabulary {
            dialect: *self,
            names,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debbugs" => Ok(Dialect::Debbugs),
            "gnats" => Ok(Dialect::Gnats),
            _ => Err(DialectError::Unknown(s.to_string())),
        }
    }
}

/// The accepted pseudo-header names for one normalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    dialect: Dialect,
    names: Vec<String>,
}

impl Vocabulary {
    /// The dialect this vocabulary belongs to.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether a raw field name is a structured field in this run.
    ///
    /// Sigil dialects accept any name carrying the sigil. Other dialects
    /// accept names whose normalized form is in the set.
    pub fn contains(&self, raw_name: &str) -> bool {
        match self.dialect.sigil() {
            Some(sigil) => raw_name.starts_with(sigil),
            None => self.names.contains(&normalize_field_name(raw_name)),
        }
    }

    /// Accepted names in priority order.
    pub fn priority(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debbugs_priority_order() {
        let vocab = Dialect::Debbugs.accepted_names(Vec::<String>::new());
        let names = vocab.priority();
        assert_eq!(names[0], "Package");
        assert_eq!(names[3], "Severity");
        assert_eq!(names.last().map(String::as_str), Some("X-Debbugs-Cc"));
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn supplemental_names_are_normalized_and_appended() {
        let vocab = Dialect::Debbugs.accepted_names(["morph", "PACKAGE", "Morph"]);
        assert!(vocab.contains("MORPH"));
        assert_eq!(vocab.priority().len(), 15);
        assert_eq!(vocab.priority()[14], "Morph");
    }

    #[test]
    fn only_control_is_repeatable() {
        for spec in Dialect::Debbugs.fields() {
            assert_eq!(
                Dialect::Debbugs.is_repeatable(spec.name),
                spec.name == "Control"
            );
        }
        assert!(Dialect::Debbugs.is_repeatable("control"));
        assert!(!Dialect::Gnats.is_repeatable(">Control"));
    }

    #[test]
    fn unknown_fields_default_to_last_wins() {
        assert_eq!(Dialect::Debbugs.policy("Mystery"), FieldPolicy::LastWins);
        assert_eq!(Dialect::Gnats.policy(">Synopsis"), FieldPolicy::LastWins);
    }

    #[test]
    fn gnats_accepts_by_sigil() {
        let vocab = Dialect::Gnats.accepted_names(["Package"]);
        assert!(vocab.contains(">Synopsis"));
        assert!(!vocab.contains("Package"));
    }

    #[test]
    fn parse_dialect() {
        assert_eq!("debbugs".parse::<Dialect>(), Ok(Dialect::Debbugs));
        assert_eq!("GNATS".parse::<Dialect>(), Ok(Dialect::Gnats));
        assert!(matches!(
            "jira".parse::<Dialect>(),
            Err(DialectError::Unknown(_))
        ));
    }
}
