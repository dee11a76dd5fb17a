//! report::template
//!
//! The blank report the reporter edits.
//!
//! # Layout
//!
//! ```text
//! Subject: <subject>
//! <pseudo-header block>
//!
//! <reporter guide, novice and standard mode only>
//!
//! <body>
//!
//! <system information, dependency versions, extra text>
//! ```
//!
//! The first blank line separates the header zone from the body, which is
//! what the normalizer expects when the edited draft comes back.

use crate::core::dialect::Dialect;
use crate::core::normalize::BOILERPLATE_MARKER;
use crate::core::types::{BugNumber, Mode, Severity};

/// Questions shown to less experienced reporters. The last line is the
/// boilerplate marker, removed again on normalization.
pub const REPORTER_GUIDE: &str = "\
Dear Maintainer,

*** Reporter, please consider answering these questions, where appropriate ***

   * What led up to the situation?
   * What exactly did you do (or not do) that was effective (or
     ineffective)?
   * What was the outcome of this action?
   * What outcome did you expect instead?
";

/// Everything the template needs.
#[derive(Debug, Clone, Default)]
pub struct TemplateInput<'a> {
    pub dialect: Dialect,
    pub package: &'a str,
    /// Use `Source:` instead of `Package:`
    pub source: bool,
    pub version: Option<&'a str>,
    pub subject: &'a str,
    pub severity: Option<Severity>,
    pub justification: Option<&'a str>,
    pub tags: &'a [String],
    /// File the report is about, for reports filed by path
    pub file: Option<&'a str>,
    pub followup: Option<BugNumber>,
    /// Extra pseudo-header lines, `Name: value`
    pub pseudo_headers: &'a [String],
    pub mode: Mode,
    /// Whether to include [`REPORTER_GUIDE`] (only honored below advanced mode)
    pub include_guide: bool,
    pub body: &'a str,
    /// Rendered system information section
    pub system_info: Option<&'a str>,
    /// Rendered dependency sections
    pub dependencies: &'a str,
    /// Additional text, such as bug script output
    pub extra: &'a str,
}

fn debbugs_block(input: &TemplateInput<'_>) -> String {
    let mut out = String::new();
    if let Some(bug) = input.followup {
        out.push_str(&format!("Followup-For: Bug #{}\n", bug));
    }
    let field = if input.source { "Source" } else { "Package" };
    out.push_str(&format!("{}: {}\n", field, input.package));
    if let Some(version) = input.version.filter(|v| !v.is_empty()) {
        out.push_str(&format!("Version: {}\n", version));
    }

    // A follow-up inherits severity and tags from the bug.
    if input.followup.is_none() {
        if let Some(severity) = input.severity {
            out.push_str(&format!("Severity: {}\n", severity.convert(Dialect::Debbugs)));
        }
        if let Some(justification) = input.justification {
            out.push_str(&format!("Justification: {}\n", justification));
        }
        if !input.tags.is_empty() {
            out.push_str(&format!("Tags: {}\n", input.tags.join(" ")));
        }
        if let Some(file) = input.file {
            out.push_str(&format!("File: {}\n", file));
        }
    }

    for line in input.pseudo_headers {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn gnats_block(input: &TemplateInput<'_>) -> String {
    let mut out = format!(">Synopsis: {}\n>Confidential: no\n", input.subject);
    out.push_str(">Category: debian-packages\n");
    out.push_str(&format!(
        ">Release: {}_{}\n",
        input.package,
        input.version.unwrap_or_default()
    ));
    if let Some(severity) = input.severity {
        out.push_str(&format!(">Severity: {}\n", severity.convert(Dialect::Gnats)));
    }
    out.push_str(">Class: sw-bug\n");
    for line in input.pseudo_headers {
        out.push_str(line);
        out.push('\n');
    }
    out
}

const GNATS_SECTIONS: &str = "\
>Description:
  <describe the bug here; use as many lines as you need>

>How-To-Repeat:
  <show how the bug is triggered>

>Fix:
  <if you have a patch or solution, put it here>

>Environment:
";

/// Produce the editable draft.
///
/// # Example
///
/// ```
/// use bugsmith::report::template::{blank_report, TemplateInput};
/// use bugsmith::core::types::Severity;
///
/// let draft = blank_report(&TemplateInput {
///     package: "hello",
///     version: Some("2.10-3"),
///     subject: "greets the wrong planet",
///     severity: Some(Severity::Minor),
///     ..Default::default()
/// });
/// assert!(draft.starts_with("Subject: greets the wrong planet\nPackage: hello\nVersion: 2.10-3\nSeverity: minor\n\n"));
/// ```
pub fn blank_report(input: &TemplateInput<'_>) -> String {
    let mut out = format!("Subject: {}\n", input.subject);

    match input.dialect {
        Dialect::Debbugs => out.push_str(&debbugs_block(input)),
        Dialect::Gnats => out.push_str(&gnats_block(input)),
    }
    out.push('\n');

    if input.include_guide && input.mode < Mode::Advanced {
        out.push_str(REPORTER_GUIDE);
        out.push_str(BOILERPLATE_MARKER);
        out.push_str("\n\n");
    }

    if input.dialect == Dialect::Gnats && input.body.is_empty() {
        out.push_str(GNATS_SECTIONS);
    }

    if !input.body.is_empty() {
        out.push_str(input.body);
        if !input.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push('\n');

    if let Some(info) = input.system_info {
        out.push_str(info);
    }
    out.push_str(input.dependencies);
    if !input.extra.is_empty() {
        out.push('\n');
        out.push_str(input.extra);
        if !input.extra.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::normalize;

    #[test]
    fn standard_draft_snapshot() {
        let tags = vec!["patch".to_string()];
        let pseudo = vec!["X-Debbugs-Cc: me@example.org".to_string()];
        let draft = blank_report(&TemplateInput {
            package: "hello",
            version: Some("2.10-3"),
            subject: "greets the wrong planet",
            severity: Some(Severity::Grave),
            justification: Some("renders package unusable"),
            tags: &tags,
            pseudo_headers: &pseudo,
            mode: Mode::Standard,
            include_guide: true,
            system_info: Some("-- System Information:\nArchitecture: amd64\n"),
            dependencies: "\nhello depends on no packages.\n",
            ..Default::default()
        });

        insta::assert_snapshot!(draft, @r"
        Subject: greets the wrong planet
        Package: hello
        Version: 2.10-3
        Severity: grave
        Justification: renders package unusable
        Tags: patch
        X-Debbugs-Cc: me@example.org

        Dear Maintainer,

        *** Reporter, please consider answering these questions, where appropriate ***

           * What led up to the situation?
           * What exactly did you do (or not do) that was effective (or
             ineffective)?
           * What was the outcome of this action?
           * What outcome did you expect instead?
        *** End of the template - remove these template lines ***


        -- System Information:
        Architecture: amd64

        hello depends on no packages.
        ");
    }

    #[test]
    fn advanced_mode_skips_guide() {
        let draft = blank_report(&TemplateInput {
            package: "hello",
            mode: Mode::Advanced,
            include_guide: true,
            body: "It broke.",
            ..Default::default()
        });
        assert_eq!(draft, "Subject: \nPackage: hello\n\nIt broke.\n\n");
    }

    #[test]
    fn followup_omits_severity() {
        let draft = blank_report(&TemplateInput {
            package: "hello",
            severity: Some(Severity::Normal),
            followup: Some(BugNumber::new(123456).unwrap()),
            ..Default::default()
        });
        assert!(draft.starts_with("Subject: \nFollowup-For: Bug #123456\nPackage: hello\n\n"));
        assert!(!draft.contains("Severity"));
    }

    #[test]
    fn source_report() {
        let draft = blank_report(&TemplateInput {
            package: "coreutils",
            source: true,
            ..Default::default()
        });
        assert!(draft.contains("\nSource: coreutils\n"));
    }

    #[test]
    fn gnats_form() {
        let draft = blank_report(&TemplateInput {
            dialect: Dialect::Gnats,
            package: "hello",
            version: Some("1.0"),
            subject: "broken",
            severity: Some(Severity::Normal),
            ..Default::default()
        });
        assert!(draft.starts_with(
            "Subject: broken\n>Synopsis: broken\n>Confidential: no\n>Category: debian-packages\n>Release: hello_1.0\n>Severity: non-critical\n>Class: sw-bug\n\n>Description:\n"
        ));
    }

    #[test]
    fn draft_round_trips_through_normalizer() {
        let tags = vec!["patch".to_string(), "upstream".to_string()];
        let draft = blank_report(&TemplateInput {
            package: "hello",
            version: Some("2.10-3"),
            subject: "wrong planet",
            severity: Some(Severity::Minor),
            tags: &tags,
            include_guide: true,
            body: "Steps to reproduce.",
            ..Default::default()
        });

        let report = normalize::<&str, &str>(Dialect::Debbugs, &draft, &[], &[]);

        assert_eq!(report.header("Subject"), Some("wrong planet"));
        assert_eq!(
            report.pseudo_headers,
            vec![
                "Package: hello",
                "Version: 2.10-3",
                "Severity: minor",
                "Tags: patch upstream",
            ]
        );
        assert!(!report.body.contains(BOILERPLATE_MARKER));
        assert!(report.body.contains("Dear Maintainer,"));
        assert!(report.body.contains("Steps to reproduce."));
    }
}
