//! core::normalize
//!
//! Report normalization: split an edited draft into transport headers,
//! pseudo-headers and body, then reconcile the pseudo-headers for the
//! target dialect.
//!
//! # Algorithm
//!
//! 1. Seed the header list from the programmatic header lines.
//! 2. Widen the accepted pseudo-header set with the programmatic
//!    pseudo-header names, and seed their values.
//! 3. Classify each draft line with a two-state machine
//!    (`ParsingHeaders` → `InBody`). The first empty line ends the header
//!    zone.
//! 4. Reconcile the collected pseudo-header occurrences per field policy and
//!    serialize them in the dialect's output order.
//!
//! # Leniency
//!
//! Normalization never fails. Header-like lines with unknown names become
//! ordinary headers, stray lines in the header zone are dropped, and a draft
//! without a blank line is all header zone with an empty body.
//!
//! # Example
//!
//! ```
//! use bugsmith::core::dialect::Dialect;
//! use bugsmith::core::normalize::normalize;
//!
//! let draft = "Severity: normal\nPackage: foo\n\nHello\n";
//! let report = normalize(Dialect::Debbugs, draft, &[] as &[&str], &["Package: foo"]);
//!
//! assert_eq!(report.pseudo_headers, vec!["Package: foo", "Severity: normal"]);
//! assert_eq!(report.body, "Hello\n");
//! assert!(report.headers.is_empty());
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::dialect::{Dialect, FieldPolicy, OutputOrder, Vocabulary};
use super::naming::{normalize_field_name, split_field};

/// Instructional line inserted into the report template and removed from
/// the body before submission.
pub const BOILERPLATE_MARKER: &str = "*** End of the template - remove these template lines ***";

/// An ordinary transport header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Header name as written
    pub name: String,
    /// Header value; folded continuation lines are joined with `\n`
    pub value: String,
}

impl Header {
    /// Create a header.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Result of normalizing a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedReport {
    /// Body text, one `\n` after every line
    pub body: String,
    /// Transport headers, programmatic ones first
    pub headers: Vec<Header>,
    /// Serialized pseudo-header lines in final order
    pub pseudo_headers: Vec<String>,
}

impl NormalizedReport {
    /// Last value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Render pseudo-headers and body as the text of a message body.
    pub fn message_body(&self) -> String {
        let mut text = String::new();
        for line in &self.pseudo_headers {
            text.push_str(line);
            text.push('\n');
        }
        if !self.pseudo_headers.is_empty() {
            text.push('\n');
        }
        text.push_str(&self.body);
        text
    }
}

/// Classification of one header-zone line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineClass<'a> {
    Boundary,
    Pseudo(&'a str, &'a str),
    Header(&'a str, &'a str),
    Continuation(&'a str),
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ParsingHeaders,
    InBody,
}

/// Line classifier for the header zone.
struct Classifier<'v> {
    vocabulary: &'v Vocabulary,
    continuable: bool,
}

impl<'v> Classifier<'v> {
    fn new(vocabulary: &'v Vocabulary) -> Self {
        Self {
            vocabulary,
            continuable: false,
        }
    }

    fn classify<'a>(&mut self, line: &'a str, have_header: bool) -> LineClass<'a> {
        if line.is_empty() {
            return LineClass::Boundary;
        }
        if line.trim().is_empty() {
            return LineClass::Discard;
        }

        if let Some((name, value)) = split_field(line) {
            if self.vocabulary.contains(name) {
                // Continuation lines belong to ordinary headers only.
                self.continuable = false;
                return LineClass::Pseudo(name, value);
            }
            self.continuable = true;
            return LineClass::Header(name, value);
        }

        if self.continuable && have_header && line.starts_with(char::is_whitespace) {
            return LineClass::Continuation(line.trim_start());
        }

        LineClass::Discard
    }
}

/// One pseudo-header occurrence, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Occurrence {
    name: String,
    value: String,
}

/// Canonical key for a pseudo-header name in the given dialect.
///
/// Sigil fields keep their spelling; the others are normalized.
fn pseudo_key(dialect: Dialect, name: &str) -> String {
    match dialect.sigil() {
        Some(sigil) if name.starts_with(sigil) => name.to_string(),
        _ => normalize_field_name(name),
    }
}

/// Normalize an edited draft.
///
/// `known_headers` are raw `Name: value` lines that always precede the
/// headers found in the draft. `known_pseudo_headers` widen the accepted
/// pseudo-header set for this run and seed values that the draft may
/// override. Lines in either list without header syntax are ignored.
pub fn normalize<H, P>(
    dialect: Dialect,
    draft: &str,
    known_headers: &[H],
    known_pseudo_headers: &[P],
) -> NormalizedReport
where
    H: AsRef<str>,
    P: AsRef<str>,
{
    let seeds: Vec<(&str, &str)> = known_pseudo_headers
        .iter()
        .filter_map(|line| split_field(line.as_ref()))
        .collect();
    let names: Vec<&str> = seeds.iter().map(|(name, _)| *name).collect();

    normalize_draft(dialect, draft, known_headers, &names, &seeds)
}

/// Normalize a draft that already contains every pseudo-header the caller
/// supplied.
///
/// `accepted_names` only widen the accepted pseudo-header set; nothing is
/// seeded, so a field removed from the draft stays removed.
pub fn normalize_accepting<H, N>(
    dialect: Dialect,
    draft: &str,
    known_headers: &[H],
    accepted_names: &[N],
) -> NormalizedReport
where
    H: AsRef<str>,
    N: AsRef<str>,
{
    let names: Vec<&str> = accepted_names.iter().map(AsRef::as_ref).collect();
    normalize_draft(dialect, draft, known_headers, &names, &[])
}

fn normalize_draft<H: AsRef<str>>(
    dialect: Dialect,
    draft: &str,
    known_headers: &[H],
    accepted_names: &[&str],
    seeds: &[(&str, &str)],
) -> NormalizedReport {
    let mut headers: Vec<Header> = known_headers
        .iter()
        .filter_map(|line| split_field(line.as_ref()))
        .map(|(name, value)| Header::new(name, value))
        .collect();

    let vocabulary = dialect.accepted_names(accepted_names);

    let mut occurrences: Vec<Occurrence> = seeds
        .iter()
        .map(|(name, value)| Occurrence {
            name: pseudo_key(dialect, name),
            value: value.to_string(),
        })
        .collect();

    let mut body = String::new();
    let mut state = State::ParsingHeaders;
    let mut classifier = Classifier::new(&vocabulary);

    for line in draft.lines() {
        match state {
            State::InBody => {
                if line.trim() != BOILERPLATE_MARKER {
                    body.push_str(line);
                    body.push('\n');
                }
            }
            State::ParsingHeaders => match classifier.classify(line, !headers.is_empty()) {
                LineClass::Boundary => state = State::InBody,
                LineClass::Pseudo(name, value) => occurrences.push(Occurrence {
                    name: pseudo_key(dialect, name),
                    value: value.to_string(),
                }),
                LineClass::Header(name, value) => headers.push(Header::new(name, value)),
                LineClass::Continuation(text) => {
                    if let Some(last) = headers.last_mut() {
                        last.value.push('\n');
                        last.value.push_str(text);
                    }
                }
                LineClass::Discard => {}
            },
        }
    }

    NormalizedReport {
        body,
        headers,
        pseudo_headers: reconcile(&vocabulary, occurrences),
    }
}

/// A reconciled output slot.
#[derive(Debug, Clone)]
enum Slot {
    Single { name: String, value: String },
    Repeated { name: String, value: String },
}

/// Reconcile pseudo-header occurrences and serialize them.
fn reconcile(vocabulary: &Vocabulary, occurrences: Vec<Occurrence>) -> Vec<String> {
    let dialect = vocabulary.dialect();
    let mut slots: Vec<Slot> = Vec::new();
    let mut singles: HashMap<String, usize> = HashMap::new();

    for Occurrence { name, value } in occurrences {
        let policy = dialect.policy(&name);
        if policy == FieldPolicy::Repeatable {
            slots.push(Slot::Repeated { name, value });
            continue;
        }

        match singles.get(&name) {
            Some(&idx) => {
                if let Slot::Single { value: current, .. } = &mut slots[idx] {
                    match policy {
                        FieldPolicy::Accumulate => accumulate(current, &value),
                        _ => *current = value,
                    }
                }
            }
            None => {
                singles.insert(name.clone(), slots.len());
                slots.push(Slot::Single { name, value });
            }
        }
    }

    match dialect.output_order() {
        OutputOrder::Priority => {
            let mut lines = Vec::with_capacity(slots.len());
            for name in vocabulary.priority() {
                if let Some(&idx) = singles.get(name) {
                    if let Slot::Single { name, value } = &slots[idx] {
                        lines.push(format!("{}: {}", name, value));
                    }
                }
            }
            lines.extend(slots.iter().filter_map(|slot| match slot {
                Slot::Repeated { name, value } => Some(format!("{}: {}", name, value)),
                Slot::Single { .. } => None,
            }));
            lines
        }
        OutputOrder::Appearance => slots
            .iter()
            .map(|slot| match slot {
                Slot::Single { name, value } | Slot::Repeated { name, value } => {
                    if value.is_empty() {
                        name.clone()
                    } else {
                        format!("{}: {}", name, value)
                    }
                }
            })
            .collect(),
    }
}

/// Append the addresses in `value` that the accumulated list lacks.
fn accumulate(current: &mut String, value: &str) {
    for address in value.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        if current.split(',').any(|existing| existing.trim() == address) {
            continue;
        }
        if !current.is_empty() {
            current.push_str(", ");
        }
        current.push_str(address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[&str] = &[];

    #[test]
    fn canonical_order_scenario() {
        let report = normalize(
            Dialect::Debbugs,
            "Severity: normal\nPackage: foo\n\nHello\n",
            NONE,
            &["Package: foo", "Severity: normal"],
        );
        assert_eq!(report.pseudo_headers, vec!["Package: foo", "Severity: normal"]);
        assert_eq!(report.body, "Hello\n");
    }

    #[test]
    fn continuation_folds_into_ordinary_header() {
        let report = normalize(
            Dialect::Debbugs,
            "X-Custom: first\n second line\n\nbody\n",
            NONE,
            NONE,
        );
        assert_eq!(
            report.headers,
            vec![Header::new("X-Custom", "first\nsecond line")]
        );
        assert_eq!(report.body, "body\n");
    }

    #[test]
    fn no_blank_line_means_empty_body() {
        let report = normalize(Dialect::Debbugs, "Package: foo\n", NONE, NONE);
        assert_eq!(report.body, "");
        assert_eq!(report.pseudo_headers, vec!["Package: foo"]);
    }

    #[test]
    fn unknown_header_is_demoted() {
        let report = normalize(Dialect::Debbugs, "Mystery: value\n\nbody\n", NONE, NONE);
        assert_eq!(report.headers, vec![Header::new("Mystery", "value")]);
        assert!(report.pseudo_headers.is_empty());
    }

    #[test]
    fn stray_continuation_after_pseudo_is_discarded() {
        let report = normalize(Dialect::Debbugs, "Package: foo\n stray\n\nbody\n", NONE, NONE);
        assert_eq!(report.pseudo_headers, vec!["Package: foo"]);
        assert!(report.headers.is_empty());
        assert_eq!(report.body, "body\n");
    }

    #[test]
    fn last_value_wins() {
        let report = normalize(
            Dialect::Debbugs,
            "Severity: minor\nSeverity: normal\nSeverity: grave\n",
            NONE,
            NONE,
        );
        assert_eq!(report.pseudo_headers, vec!["Severity: grave"]);
    }

    #[test]
    fn cc_values_accumulate() {
        let report = normalize(
            Dialect::Debbugs,
            "X-Debbugs-Cc: a@x\nx-debbugs-cc: b@y\n",
            NONE,
            NONE,
        );
        assert_eq!(report.pseudo_headers, vec!["X-Debbugs-Cc: a@x, b@y"]);
    }

    #[test]
    fn cc_seed_left_in_draft_is_not_duplicated() {
        let report = normalize(
            Dialect::Debbugs,
            "X-Debbugs-Cc: a@x\n\n",
            NONE,
            &["X-Debbugs-Cc: a@x"],
        );
        assert_eq!(report.pseudo_headers, vec!["X-Debbugs-Cc: a@x"]);
    }

    #[test]
    fn cc_address_list_seed_is_not_duplicated() {
        let report = normalize(
            Dialect::Debbugs,
            "X-Debbugs-Cc: a@x, b@y\n\nbody\n",
            NONE,
            &["X-Debbugs-Cc: a@x, b@y"],
        );
        assert_eq!(report.pseudo_headers, vec!["X-Debbugs-Cc: a@x, b@y"]);
    }

    #[test]
    fn cc_lists_merge_address_by_address() {
        let report = normalize(
            Dialect::Debbugs,
            "X-Debbugs-Cc: b@y,c@z\n\n",
            NONE,
            &["X-Debbugs-Cc: a@x, b@y"],
        );
        assert_eq!(report.pseudo_headers, vec!["X-Debbugs-Cc: a@x, b@y, c@z"]);
    }

    #[test]
    fn whitespace_only_line_is_dropped_from_headers() {
        let report = normalize(Dialect::Debbugs, "Subject: crash\n \nPackage: foo\n\nbody\n", NONE, NONE);
        assert_eq!(report.pseudo_headers, vec!["Package: foo"]);
        assert_eq!(report.header("Subject"), Some("crash"));
        assert_eq!(report.body, "body\n");
    }

    #[test]
    fn whitespace_only_line_after_pseudo_header_is_discarded() {
        let report = normalize(Dialect::Debbugs, "Package: foo\n\t\nVersion: 1.0\n\nbody\n", NONE, NONE);
        assert_eq!(report.pseudo_headers, vec!["Package: foo", "Version: 1.0"]);
        assert!(report.headers.is_empty());
        assert_eq!(report.body, "body\n");
    }

    #[test]
    fn accepted_names_widen_without_seeding() {
        let kept = normalize_accepting(Dialect::Debbugs, "Package: foo\nMorph: x\n\nbody\n", NONE, &["Morph"]);
        assert_eq!(kept.pseudo_headers, vec!["Package: foo", "Morph: x"]);
        assert!(kept.headers.is_empty());

        let deleted = normalize_accepting(Dialect::Debbugs, "Package: foo\n\nbody\n", NONE, &["Morph"]);
        assert_eq!(deleted.pseudo_headers, vec!["Package: foo"]);
    }

    #[test]
    fn repeatable_fields_are_preserved() {
        let report = normalize(
            Dialect::Debbugs,
            "Control: affects -1 src:foo\nPackage: foo\nControl: affects -1 src:bar\n\n",
            NONE,
            NONE,
        );
        assert_eq!(
            report.pseudo_headers,
            vec![
                "Package: foo",
                "Control: affects -1 src:foo",
                "Control: affects -1 src:bar",
            ]
        );
    }

    #[test]
    fn known_names_widen_accepted_set() {
        let report = normalize(Dialect::Debbugs, "Morph: hot\n\n", NONE, &["Morph: cool"]);
        assert_eq!(report.pseudo_headers, vec!["Morph: hot"]);
        assert!(report.headers.is_empty());
    }

    #[test]
    fn draft_value_overrides_programmatic_seed() {
        let report = normalize(
            Dialect::Debbugs,
            "Version: 2.0\n\n",
            NONE,
            &["Package: foo", "Version: 1.0"],
        );
        assert_eq!(report.pseudo_headers, vec!["Package: foo", "Version: 2.0"]);
    }

    #[test]
    fn programmatic_headers_come_first() {
        let report = normalize(
            Dialect::Debbugs,
            "Subject: crash\n\n",
            &["X-Debbugs-CC: reportbug@packages.qa.debian.org"],
            NONE,
        );
        assert_eq!(report.headers[0].name, "X-Debbugs-CC");
        assert_eq!(report.headers[1], Header::new("Subject", "crash"));
    }

    #[test]
    fn duplicate_ordinary_headers_pass_through() {
        let report = normalize(Dialect::Debbugs, "Cc: a\nCc: b\n\n", NONE, NONE);
        assert_eq!(report.headers.len(), 2);
    }

    #[test]
    fn boilerplate_marker_removed_from_body() {
        let draft = format!(
            "Package: foo\n\nline one\n\n  {}  \nline two\n",
            BOILERPLATE_MARKER
        );
        let report = normalize(Dialect::Debbugs, &draft, NONE, NONE);
        assert_eq!(report.body, "line one\n\nline two\n");
    }

    #[test]
    fn gnats_uses_sigil_and_appearance_order() {
        let draft = ">Synopsis: it breaks\nFrom: me@example.com\n>Category: debian-packages\n>Description:\n>Synopsis: it really breaks\n\ndetails\n";
        let report = normalize(Dialect::Gnats, draft, NONE, NONE);
        assert_eq!(
            report.pseudo_headers,
            vec![
                ">Synopsis: it really breaks",
                ">Category: debian-packages",
                ">Description",
            ]
        );
        assert_eq!(report.headers, vec![Header::new("From", "me@example.com")]);
        assert_eq!(report.body, "details\n");
    }

    #[test]
    fn gnats_demotes_unsigiled_known_names() {
        let report = normalize(Dialect::Gnats, "Package: foo\n\n", NONE, NONE);
        assert_eq!(report.headers, vec![Header::new("Package", "foo")]);
        assert!(report.pseudo_headers.is_empty());
    }

    #[test]
    fn leading_continuation_is_discarded() {
        let report = normalize(
            Dialect::Debbugs,
            " orphan\nSubject: x\n\n",
            &["From: me@example.com"],
            NONE,
        );
        assert_eq!(report.headers[0], Header::new("From", "me@example.com"));
        assert_eq!(report.headers.len(), 2);
    }

    #[test]
    fn crlf_lines_are_split() {
        let report = normalize(Dialect::Debbugs, "Package: foo\r\n\r\nbody\r\n", NONE, NONE);
        assert_eq!(report.pseudo_headers, vec!["Package: foo"]);
        assert_eq!(report.body, "body\n");
    }

    #[test]
    fn message_body_places_pseudo_block_first() {
        let report = normalize(Dialect::Debbugs, "Package: foo\n\nHello\n", NONE, NONE);
        assert_eq!(report.message_body(), "Package: foo\n\nHello\n");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let report = normalize(Dialect::Debbugs, "subject: one\nSubject: two\n\n", NONE, NONE);
        assert_eq!(report.header("SUBJECT"), Some("two"));
    }

    #[test]
    fn mixed_report_from_release_request() {
        let message = "Subject: unblock: reportbug/4.12.6\n\
Package: release.debian.org\n\
User: release.debian.org@packages.debian.org\n\
Usertags: unblock\n\
Severity: normal\n\
Morph: cool\n\
Control: testcontrol1\n\
Control: testcontrol2\n\
Continuation:\n \
header\n\
\n\
Please unblock package reportbug\n\
\n\
-- System Information:\n";
        let report = normalize(
            Dialect::Debbugs,
            message,
            &["X-Debbugs-CC: reportbug@packages.qa.debian.org"],
            &["Morph: cool", "Control: testcontrol1", "Control: testcontrol2"],
        );

        assert_eq!(report.header("Subject"), Some("unblock: reportbug/4.12.6"));
        assert_eq!(report.header("Continuation"), Some("\nheader"));
        assert!(report.body.contains("Please unblock package reportbug"));
        assert!(report.body.contains("System Information"));
        assert_eq!(
            report.pseudo_headers,
            vec![
                "Package: release.debian.org",
                "Severity: normal",
                "User: release.debian.org@packages.debian.org",
                "Usertags: unblock",
                "Morph: cool",
                "Control: testcontrol1",
                "Control: testcontrol2",
                "Control: testcontrol1",
                "Control: testcontrol2",
            ]
        );
    }
}
