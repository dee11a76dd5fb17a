//! engine::session
//!
//! One report-composition session.
//!
//! [`ReportSession::run`] walks the reporter from a package name to a
//! delivered message:
//!
//! 1. resolve and validate the package name
//! 2. pick the request builder for it
//! 3. look up the installed package and its bug control file
//! 4. build the draft seed, then (online only) list existing reports and
//!    compare the installed version with the archive
//! 5. render the editable draft
//! 6. let the reporter edit it, asking again when nothing changed
//! 7. normalize the draft and make sure it has a subject
//! 8. assemble the message, confirm and deliver

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::Context;
use crate::core::bugscript::{self, BugScriptOutput};
use crate::core::control::{BugFiles, ControlFile, DEFAULT_BUG_DIR};
use crate::core::naming::split_field;
use crate::core::normalize::{normalize_accepting, Header, NormalizedReport};
use crate::core::systems::TrackerSystem;
use crate::core::types::{BugNumber, Fingerprint, Mode, PackageName, SendTo};
use crate::mailer::{DeliveryReceipt, Transport};
use crate::pkgdb::{lookup_status, PackageDb, PackageStatus, StatusCache};
use crate::report::{blank_report, dependency_section, Attachment, MessageParts, OutgoingMessage, TemplateInput};
use crate::requests::{DraftSeed, PackageContext, Presets, RequestError, RequestRegistry};
use crate::tracker::Tracker;
use crate::ui::editor::Editor;
use crate::ui::output;
use crate::ui::prompts::{Choice, Interaction, PromptError};
use crate::versions::{check_available, VersionSource, DEFAULT_DISTS};

/// Settings for one session, resolved from configuration and flags.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Package named on the command line
    pub package: Option<String>,
    /// Answers given on the command line
    pub presets: Presets,
    pub mode: Mode,
    /// Existing bug to follow up on
    pub followup: Option<BugNumber>,
    pub send_to: SendTo,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub cc: Vec<String>,
    /// Extra mail headers, `Name: value`
    pub headers: Vec<String>,
    /// Extra pseudo-headers, `Name: value`
    pub pseudo_headers: Vec<String>,
    /// Prepared body; the editor is skipped when set
    pub body: Option<String>,
    pub check_available: bool,
    pub query_bts: bool,
    /// Distributions compared against the installed version
    pub dists: Vec<String>,
    /// Directory holding per-package control files and bug scripts
    pub bug_dir: PathBuf,
    /// Rendered system information section
    pub system_info: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            package: None,
            presets: Presets::default(),
            mode: Mode::default(),
            followup: None,
            send_to: SendTo::default(),
            from: None,
            reply_to: None,
            cc: Vec::new(),
            headers: Vec::new(),
            pseudo_headers: Vec::new(),
            body: None,
            check_available: true,
            query_bts: true,
            dists: DEFAULT_DISTS.iter().map(|d| d.to_string()).collect(),
            bug_dir: PathBuf::from(DEFAULT_BUG_DIR),
            system_info: None,
        }
    }
}

/// Everything a session talks to.
pub struct Collaborators<'a> {
    pub db: &'a dyn PackageDb,
    pub tracker: &'a dyn Tracker,
    pub versions: &'a dyn VersionSource,
    pub ui: &'a mut dyn Interaction,
    pub editor: &'a mut dyn Editor,
    pub transport: &'a dyn Transport,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The message was handed to the transport
    Delivered(DeliveryReceipt),
    /// The reporter stopped; nothing was sent
    Cancelled(String),
}

/// A report-composition session.
pub struct ReportSession<'a> {
    ctx: Context,
    system: TrackerSystem,
    options: SessionOptions,
    registry: RequestRegistry,
    cache: StatusCache,
    io: Collaborators<'a>,
}

fn cancelled(reason: &str) -> Result<SessionOutcome> {
    Ok(SessionOutcome::Cancelled(reason.to_string()))
}

impl<'a> ReportSession<'a> {
    pub fn new(ctx: Context, system: TrackerSystem, options: SessionOptions, io: Collaborators<'a>) -> Self {
        Self {
            ctx,
            system,
            options,
            registry: RequestRegistry::default(),
            cache: StatusCache::new(),
            io,
        }
    }

    /// Replace the request registry.
    pub fn with_registry(mut self, registry: RequestRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Package status cache, shared by every lookup in the session.
    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    /// Run the session.
    ///
    /// End of input at any question cancels the session.
    pub async fn run(&mut self) -> Result<SessionOutcome> {
        match self.compose().await {
            Err(err) if matches!(err.downcast_ref::<PromptError>(), Some(PromptError::Cancelled)) => {
                cancelled("input ended")
            }
            other => other,
        }
    }

    async fn compose(&mut self) -> Result<SessionOutcome> {
        let verbosity = self.ctx.verbosity();

        let Some(package) = self.resolve_package()? else {
            return cancelled("no package specified");
        };

        let special = self.registry.tags().contains(&package.as_str());
        let pseudo = special || self.system.is_pseudo_package(package.as_str());
        let status = if pseudo || !self.system.query_dpkg {
            output::debug(format!("not looking up {} in the package database", package), verbosity);
            None
        } else {
            match self.lookup(package.as_str()) {
                Some(status) => Some(status),
                None => {
                    let prompt = format!("{} does not appear to be installed. Report it anyway?", package);
                    if !self.io.ui.ask_yes_no(&prompt, true)? {
                        return cancelled("package not installed");
                    }
                    None
                }
            }
        };
        let installed = status.as_ref().filter(|s| s.installed);

        let files = BugFiles::locate(&self.options.bug_dir, package.as_str());
        let control = match files.read_control() {
            Ok(control) => control.unwrap_or_default(),
            Err(e) => {
                output::warn(format!("unable to read the bug control file: {}", e), verbosity);
                ControlFile::default()
            }
        };
        let report_package = match control.submit_as.as_deref().map(PackageName::new) {
            Some(Ok(target)) => {
                output::print(format!("Reports on {} are filed against {}.", package, target), verbosity);
                target
            }
            Some(Err(e)) => {
                output::warn(format!("ignoring Submit-As in the control file: {}", e), verbosity);
                package.clone()
            }
            None => package.clone(),
        };

        let mut seed = match self.build_seed(&package) {
            Ok(seed) => seed,
            Err(RequestError::Aborted(reason)) => return Ok(SessionOutcome::Cancelled(reason)),
            Err(RequestError::Prompt(PromptError::Cancelled)) => return cancelled("input ended"),
            Err(e) => return Err(e).context("failed to prepare the report"),
        };
        let prefix = format!("{}:", report_package);
        if !special && !seed.subject.is_empty() && !seed.subject.starts_with(&prefix) {
            seed.subject = format!("{} {}", prefix, seed.subject);
        }

        if self.ctx.offline {
            output::debug("offline: skipping tracker and archive lookups", verbosity);
        } else {
            if self.options.query_bts && seed.query_tracker && !self.review_open_reports(&report_package).await? {
                return cancelled("the problem is already reported");
            }
            if self.options.check_available {
                if let Some(status) = installed {
                    if !self.review_versions(&package, &status.version).await? {
                        return cancelled("a newer version is available");
                    }
                }
            }
        }

        let script = files.script.as_deref().and_then(|path| {
            output::debug(format!("running bug script {}", path.display()), verbosity);
            match bugscript::run(path) {
                Ok(out) => Some(out),
                Err(e) => {
                    output::warn(e, verbosity);
                    None
                }
            }
        });

        let mut pseudo_lines = seed.pseudo_headers.clone();
        pseudo_lines.extend(self.options.pseudo_headers.iter().cloned());
        if let Some(script) = &script {
            pseudo_lines.extend(script.pseudo_headers.iter().cloned());
        }

        let draft = self.render(&seed, &report_package, installed, &control, script.as_ref(), &pseudo_lines, pseudo);

        let Some(draft) = self.edit(draft)? else {
            return cancelled("report not sent");
        };

        let mut report = self.normalize(&draft, &seed, script.as_ref(), &pseudo_lines);
        if report.header("Subject").map_or(true, |s| s.trim().is_empty()) {
            let subject = self
                .io
                .ui
                .ask_text("Please enter a subject for the report:", None)
                .context("the report needs a subject")?;
            if subject.trim().is_empty() {
                return cancelled("no subject given");
            }
            set_subject(&mut report, subject.trim());
        }

        let to = match self.options.followup {
            Some(bug) => self.system.bug_address(bug.get()),
            None => control
                .send_to
                .clone()
                .unwrap_or_else(|| self.system.submission_address(self.options.send_to)),
        };
        let mut message = OutgoingMessage::assemble(
            MessageParts {
                from: self.options.from.clone(),
                to: vec![to.clone()],
                cc: self.options.cc.clone(),
                reply_to: self.options.reply_to.clone(),
                ..Default::default()
            },
            &report,
        );
        if let Some(script) = &script {
            message.attachments = self.attachments(script);
        }

        let prompt = format!("Send the report on {} to {}?", report_package, to);
        if !self.io.ui.ask_yes_no(&prompt, true)? {
            return cancelled("report not sent");
        }

        output::debug(format!("delivering through {}", self.io.transport.name()), verbosity);
        let receipt = self
            .io
            .transport
            .deliver(&message)
            .context("failed to deliver the report")?;
        Ok(SessionOutcome::Delivered(receipt))
    }

    /// Read the files a bug script asked to attach. Unreadable files and
    /// channels without attachment support only produce warnings.
    fn attachments(&self, script: &BugScriptOutput) -> Vec<Attachment> {
        let verbosity = self.ctx.verbosity();
        let attachments: Vec<Attachment> = script
            .attachments
            .iter()
            .filter_map(|path| match Attachment::read(Path::new(path)) {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    output::warn(format!("cannot attach {}: {}", path, e), verbosity);
                    None
                }
            })
            .collect();

        if !attachments.is_empty() && !self.io.transport.carries_attachments() {
            output::warn(
                format!(
                    "the {} channel cannot carry attachments; dropping {} file(s)",
                    self.io.transport.name(),
                    attachments.len()
                ),
                verbosity,
            );
            return Vec::new();
        }
        attachments
    }

    fn resolve_package(&mut self) -> Result<Option<PackageName>> {
        let raw = match self.options.package.clone() {
            Some(name) => name,
            None => match self.io.ui.ask_text("Which package is the bug in?", None) {
                Ok(name) => name,
                Err(PromptError::Cancelled) => return Ok(None),
                Err(e) => return Err(e).context("a package name is required"),
            },
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        PackageName::new(raw)
            .map(Some)
            .with_context(|| format!("invalid package name '{}'", raw))
    }

    fn lookup(&mut self, name: &str) -> Option<PackageStatus> {
        let name = PackageName::new(name).ok()?;
        match lookup_status(self.io.db, &mut self.cache, &name) {
            Ok(status) => status,
            Err(e) => {
                output::warn(e, self.ctx.verbosity());
                None
            }
        }
    }

    fn build_seed(&mut self, package: &PackageName) -> Result<DraftSeed, RequestError> {
        let builder = self.registry.builder_for(package.as_str());
        output::debug(format!("using the {} request builder", builder.name()), self.ctx.verbosity());

        let ctx = PackageContext {
            package,
            system: &self.system,
            db: self.io.db,
            from: self.options.from.as_deref(),
            mode: self.options.mode,
            online: !self.ctx.offline,
            presets: &self.options.presets,
        };
        builder.build(&ctx, &mut *self.io.ui)
    }

    async fn review_open_reports(&mut self, package: &PackageName) -> Result<bool> {
        let verbosity = self.ctx.verbosity();
        output::debug(
            format!("asking {} for reports on {}", self.io.tracker.name(), package),
            verbosity,
        );

        match self.io.tracker.open_reports(package).await {
            Ok(reports) if reports.is_empty() => Ok(true),
            Ok(reports) => {
                self.io.ui.display(&format!(
                    "{} report(s) already filed against {}:\n{}",
                    reports.len(),
                    package,
                    output::format_list(&reports, "  ")
                ));
                Ok(self
                    .io
                    .ui
                    .ask_yes_no("Is your problem different from these? Continue with a new report?", true)?)
            }
            Err(e) => {
                output::warn(format!("unable to query the tracker: {}", e), verbosity);
                Ok(true)
            }
        }
    }

    async fn review_versions(&mut self, package: &PackageName, installed: &str) -> Result<bool> {
        let verbosity = self.ctx.verbosity();
        output::debug(
            format!("checking {} for newer versions of {}", self.io.versions.name(), package),
            verbosity,
        );

        let available = match self.io.versions.available(package, &self.options.dists).await {
            Ok(available) => available,
            Err(e) => {
                output::warn(format!("unable to check for newer versions: {}", e), verbosity);
                return Ok(true);
            }
        };

        let availability = check_available(installed, &available);
        if availability.installed_is_newest {
            output::debug(format!("{} {} is newer than the archive", package, installed), verbosity);
        }
        if !availability.has_newer() {
            return Ok(true);
        }

        let lines: Vec<String> = availability
            .newer
            .iter()
            .map(|(dist, version)| format!("{}: {}", dist, version))
            .collect();
        self.io.ui.display(&format!(
            "Newer versions of {} than the installed {} are available:\n{}",
            package,
            installed,
            output::format_list(&lines, "  ")
        ));
        Ok(self
            .io
            .ui
            .ask_yes_no("Report the bug against the installed version anyway?", true)?)
    }

    #[allow(clippy::too_many_arguments)]
    fn render(
        &mut self,
        seed: &DraftSeed,
        package: &PackageName,
        installed: Option<&PackageStatus>,
        control: &ControlFile,
        script: Option<&BugScriptOutput>,
        pseudo_lines: &[String],
        pseudo: bool,
    ) -> String {
        let mut dependencies = String::new();
        if let Some(status) = installed {
            dependencies.push_str(&dependency_section(self.io.db, &mut self.cache, status));
        }
        for name in &control.report_with {
            if let Some(status) = self.lookup(name) {
                dependencies.push_str(&dependency_section(self.io.db, &mut self.cache, &status));
            }
        }
        if !control.package_status.is_empty() {
            dependencies.push_str("\nVersions of other relevant packages:\n");
            for name in &control.package_status {
                let version = self
                    .lookup(name)
                    .filter(|s| s.installed)
                    .map(|s| s.version)
                    .unwrap_or_else(|| "<none>".to_string());
                dependencies.push_str(&format!("{}  {}\n", name, version));
            }
        }

        let extra = match script {
            Some(script) if !script.text.trim().is_empty() => {
                format!("\n-- Package-specific info:\n{}", script.text)
            }
            _ => String::new(),
        };

        blank_report(&TemplateInput {
            dialect: self.system.dialect,
            package: package.as_str(),
            source: false,
            version: installed.map(|s| s.version.as_str()),
            subject: &seed.subject,
            severity: seed.severity,
            justification: seed.justification.as_deref(),
            tags: &seed.tags,
            file: None,
            followup: self.options.followup,
            pseudo_headers: pseudo_lines,
            mode: self.options.mode,
            include_guide: seed.include_template,
            body: self.options.body.as_deref().unwrap_or(&seed.body),
            system_info: if pseudo { None } else { self.options.system_info.as_deref() },
            dependencies: &dependencies,
            extra: &extra,
        })
    }

    /// Edit loop. `None` when the reporter quits.
    fn edit(&mut self, mut draft: String) -> Result<Option<String>> {
        if !self.ctx.interactive || self.options.body.is_some() {
            return Ok(Some(draft));
        }

        let original = Fingerprint::compute(&draft);
        let choices = [
            Choice::new("e", "edit the report again"),
            Choice::new("q", "quit without sending"),
            Choice::new("s", "send the report as it is"),
        ];
        loop {
            draft = self.io.editor.edit(&draft).context("failed to edit the report")?;
            if Fingerprint::compute(&draft) != original {
                return Ok(Some(draft));
            }
            let answer = self
                .io
                .ui
                .ask_choice("The report was not changed. What now?", &choices, Some("e"))?;
            match answer.as_str() {
                "q" => return Ok(None),
                "s" => return Ok(Some(draft)),
                _ => {}
            }
        }
    }

    fn normalize(
        &self,
        draft: &str,
        seed: &DraftSeed,
        script: Option<&BugScriptOutput>,
        pseudo_lines: &[String],
    ) -> NormalizedReport {
        let dialect = self.system.dialect;

        let mut known_headers: Vec<String> = seed.headers.iter().map(Header::to_string).collect();
        known_headers.extend(self.options.headers.iter().cloned());
        if let Some(script) = script {
            known_headers.extend(script.headers.iter().cloned());
        }

        // Every pseudo-line was rendered into the draft, so the draft alone
        // decides which survive.
        let names: Vec<&str> = pseudo_lines
            .iter()
            .filter_map(|line| split_field(line).map(|(name, _)| name))
            .collect();

        normalize_accepting(dialect, draft, &known_headers, &names)
    }
}

fn set_subject(report: &mut NormalizedReport, subject: &str) {
    match report
        .headers
        .iter_mut()
        .find(|h| h.name.eq_ignore_ascii_case("subject"))
    {
        Some(header) => header.value = subject.to_string(),
        None => report.headers.insert(0, Header::new("Subject", subject)),
    }
}
