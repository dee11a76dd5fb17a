//! requests::standard
//!
//! Ordinary bug report against a package.

use super::{DraftBuilder, DraftSeed, PackageContext, RequestError};
use crate::core::dialect::Dialect;
use crate::core::types::{Mode, Severity};
use crate::ui::prompts::{Choice, Interaction};

const TAGS: &[(&str, &str)] = &[
    ("a11y", "This bug is relevant to the accessibility of the package."),
    ("d-i", "This bug is relevant to the development of debian-installer."),
    ("ftbfs", "The package fails to build from source."),
    ("ipv6", "This bug affects support for Internet Protocol version 6."),
    ("l10n", "This bug reports a localization/internationalization issue."),
    ("lfs", "This bug affects support for large files (over 2 gigabytes)."),
    ("newcomer", "This bug has a known solution but the maintainer requests someone else implement it."),
    ("patch", "You are including a patch to fix this problem."),
    ("upstream", "This bug applies to the upstream part of the package."),
];

const SECURITY_TAG: (&str, &str) = ("security", "This problem is a security vulnerability in Debian.");

/// Tags offered for a report of the given severity and mode.
///
/// Release-critical severities and expert mode add `security`; novice mode
/// hides `newcomer`.
pub fn available_tags(severity: Option<Severity>, mode: Mode) -> Vec<(&'static str, &'static str)> {
    let mut tags: Vec<_> = TAGS
        .iter()
        .copied()
        .filter(|(name, _)| mode >= Mode::Standard || *name != "newcomer")
        .collect();

    if severity.is_some_and(|s| s.is_release_critical()) || mode > Mode::Advanced {
        tags.push(SECURITY_TAG);
        tags.sort_by_key(|(name, _)| *name);
    }
    tags
}

/// Builder for an ordinary report.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRequest;

impl StandardRequest {
    fn ask_severity(
        &self,
        ctx: &PackageContext<'_>,
        ui: &mut dyn Interaction,
    ) -> Result<Severity, RequestError> {
        let dialect = ctx.system.dialect;
        if let Some(preset) = ctx.presets.severity {
            return Ok(preset.convert(dialect));
        }

        let choices: Vec<Choice> = Severity::for_dialect(dialect)
            .iter()
            .map(|s| Choice::new(s.name(), s.description()))
            .collect();
        let default = match dialect {
            Dialect::Debbugs => Severity::Normal,
            Dialect::Gnats => Severity::NonCritical,
        };

        let answer = ui.ask_choice(
            "How would you rate the severity of this problem or report?",
            &choices,
            Some(default.name()),
        )?;
        Ok(answer.parse().unwrap_or(default))
    }

    fn ask_justification(
        &self,
        severity: Severity,
        ui: &mut dyn Interaction,
    ) -> Result<Option<String>, RequestError> {
        let reasons = severity.justifications();
        if reasons.is_empty() {
            return Ok(None);
        }

        let choices: Vec<Choice> = reasons
            .iter()
            .map(|(name, desc)| Choice::new(*name, *desc))
            .collect();
        let answer = ui.ask_choice(
            &format!("Please select the reason this is a {} bug.", severity),
            &choices,
            Some("unknown"),
        )?;
        Ok(Some(answer))
    }

    fn ask_tags(
        &self,
        ctx: &PackageContext<'_>,
        severity: Severity,
        ui: &mut dyn Interaction,
    ) -> Result<Vec<String>, RequestError> {
        if !ctx.presets.tags.is_empty() || ctx.mode < Mode::Advanced {
            return Ok(ctx.presets.tags.clone());
        }

        let offered = available_tags(Some(severity), ctx.mode);
        let listing: Vec<String> = offered
            .iter()
            .map(|(name, desc)| format!("  {:<10} {}", name, desc))
            .collect();
        ui.display(&format!("Available tags:\n{}", listing.join("\n")));

        let answer = ui.ask_text("Tags for this report (space separated, empty for none)?", Some(""))?;
        let mut tags = Vec::new();
        for word in answer.split([' ', ',']).filter(|w| !w.is_empty()) {
            if offered.iter().any(|(name, _)| *name == word) {
                if !tags.iter().any(|t| t == word) {
                    tags.push(word.to_string());
                }
            } else {
                ui.display(&format!("Ignoring unknown tag '{}'.", word));
            }
        }
        Ok(tags)
    }
}

impl DraftBuilder for StandardRequest {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn build(
        &self,
        ctx: &PackageContext<'_>,
        ui: &mut dyn Interaction,
    ) -> Result<DraftSeed, RequestError> {
        let subject = match &ctx.presets.subject {
            Some(subject) => subject.clone(),
            None => ui.ask_text("Briefly describe the problem (max. 100 characters allowed).", Some(""))?,
        };

        let severity = self.ask_severity(ctx, ui)?;
        let justification = self.ask_justification(severity, ui)?;
        let tags = self.ask_tags(ctx, severity, ui)?;

        Ok(DraftSeed {
            subject: subject.trim().to_string(),
            severity: Some(severity),
            justification,
            tags,
            ..DraftSeed::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::test_support::Fixture;
    use crate::ui::prompts::ScriptedUi;

    #[test]
    fn asks_subject_and_severity() {
        let fx = Fixture::new("coreutils");
        let mut ui = ScriptedUi::new(["ls crashes", "important"]);

        let seed = StandardRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.subject, "ls crashes");
        assert_eq!(seed.severity, Some(Severity::Important));
        assert_eq!(seed.justification, None);
        assert!(seed.tags.is_empty());
        assert!(seed.query_tracker);
        assert!(seed.include_template);
    }

    #[test]
    fn grave_asks_justification() {
        let fx = Fixture::new("coreutils");
        let mut ui = ScriptedUi::new(["", "grave", "user security hole"]);

        let seed = StandardRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.subject, "");
        assert_eq!(seed.justification.as_deref(), Some("user security hole"));
    }

    #[test]
    fn presets_skip_questions() {
        let mut fx = Fixture::new("coreutils");
        fx.presets.subject = Some("preset subject".into());
        fx.presets.severity = Some(Severity::Minor);
        fx.presets.tags = vec!["patch".into()];
        fx.mode = Mode::Expert;
        let mut ui = ScriptedUi::new(Vec::<String>::new());

        let seed = StandardRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.subject, "preset subject");
        assert_eq!(seed.severity, Some(Severity::Minor));
        assert_eq!(seed.tags, vec!["patch"]);
        assert!(ui.transcript().is_empty());
    }

    #[test]
    fn gnats_converts_preset_severity() {
        let mut fx = Fixture::new("coreutils");
        fx.system.dialect = Dialect::Gnats;
        fx.presets.severity = Some(Severity::Wishlist);
        let mut ui = ScriptedUi::new([""]);

        let seed = StandardRequest.build(&fx.ctx(), &mut ui).unwrap();
        assert_eq!(seed.severity, Some(Severity::NonCritical));
    }

    #[test]
    fn advanced_mode_asks_tags() {
        let mut fx = Fixture::new("coreutils");
        fx.mode = Mode::Advanced;
        let mut ui = ScriptedUi::new(["subject", "normal", "patch bogus upstream patch"]);

        let seed = StandardRequest.build(&fx.ctx(), &mut ui).unwrap();

        assert_eq!(seed.tags, vec!["patch", "upstream"]);
        assert!(ui
            .transcript()
            .iter()
            .any(|line| line == "Ignoring unknown tag 'bogus'."));
    }

    #[test]
    fn tag_table_depends_on_severity_and_mode() {
        let has = |tags: &[(&str, &str)], name: &str| tags.iter().any(|(n, _)| *n == name);

        let novice = available_tags(None, Mode::Novice);
        assert!(!has(&novice, "newcomer"));
        assert!(!has(&novice, "security"));

        let rc = available_tags(Some(Severity::Serious), Mode::Standard);
        assert!(has(&rc, "security"));
        assert!(has(&rc, "newcomer"));

        assert!(has(&available_tags(None, Mode::Expert), "security"));
    }
}
