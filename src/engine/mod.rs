//! engine
//!
//! Runs one report-composition session from package name to delivery.
//!
//! # Architecture
//!
//! The engine owns no I/O of its own. Every collaborator arrives as a
//! trait object so the same flow runs against the real system or against
//! in-memory doubles:
//!
//! | Concern | Trait |
//! |---------|-------|
//! | questions | [`Interaction`](crate::ui::prompts::Interaction) |
//! | draft editing | [`Editor`](crate::ui::editor::Editor) |
//! | installed packages | [`PackageDb`](crate::pkgdb::PackageDb) |
//! | existing reports | [`Tracker`](crate::tracker::Tracker) |
//! | archive versions | [`VersionSource`](crate::versions::VersionSource) |
//! | delivery | [`Transport`](crate::mailer::Transport) |
//!
//! # Session Lifecycle
//!
//! ```text
//! Package -> Builder -> Status/Control -> Seed -> Lookups -> Edit -> Normalize -> Deliver
//! ```
//!
//! Failed lookups (tracker, archive versions, package database) are
//! reported as warnings and the session continues. A reporter who declines
//! to go on ends the session with [`SessionOutcome::Cancelled`].

pub mod session;

pub use session::{Collaborators, ReportSession, SessionOptions, SessionOutcome};

use crate::core::systems::{SystemKind, TrackerSystem};
use crate::mailer::DeliveryChannel;
use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// No network lookups.
    pub offline: bool,
}

impl Context {
    /// Output verbosity for these flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            debug: false,
            quiet: false,
            interactive: true,
            offline: false,
        }
    }
}

/// Delivery channel actually used for a system.
///
/// Systems that only take reports through `mailto:` cannot be fed to an
/// MTA or an SMTP server; any other explicit choice is kept.
pub fn resolve_channel(system: &TrackerSystem, requested: DeliveryChannel) -> DeliveryChannel {
    match (system.kind, requested) {
        (SystemKind::Mailto, DeliveryChannel::Mta(_) | DeliveryChannel::Smtp(_)) => DeliveryChannel::Mailto,
        (_, channel) => channel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod context {
        use super::*;

        #[test]
        fn default_values() {
            let ctx = Context::default();
            assert!(!ctx.debug);
            assert!(!ctx.quiet);
            assert!(ctx.interactive);
            assert!(!ctx.offline);
            assert_eq!(ctx.verbosity(), Verbosity::Normal);
        }

        #[test]
        fn quiet_wins_over_debug() {
            let ctx = Context {
                debug: true,
                quiet: true,
                ..Context::default()
            };
            assert_eq!(ctx.verbosity(), Verbosity::Quiet);

            let ctx = Context {
                debug: true,
                ..Context::default()
            };
            assert_eq!(ctx.verbosity(), Verbosity::Debug);
        }
    }

    mod channel {
        use super::*;

        #[test]
        fn mailto_system_overrides_mta() {
            let channel = resolve_channel(&TrackerSystem::ubuntu(), DeliveryChannel::Mta("/usr/sbin/sendmail".into()));
            assert_eq!(channel, DeliveryChannel::Mailto);

            let smtp = crate::mailer::SmtpSettings::parse("mail.example.org").unwrap();
            let channel = resolve_channel(&TrackerSystem::ubuntu(), DeliveryChannel::Smtp(smtp));
            assert_eq!(channel, DeliveryChannel::Mailto);
        }

        #[test]
        fn explicit_file_is_kept() {
            let channel = resolve_channel(&TrackerSystem::ubuntu(), DeliveryChannel::File("/tmp/r".into()));
            assert_eq!(channel, DeliveryChannel::File("/tmp/r".into()));
        }

        #[test]
        fn debbugs_keeps_mta() {
            let channel = resolve_channel(&TrackerSystem::debian(), DeliveryChannel::Mta("/usr/sbin/sendmail".into()));
            assert_eq!(channel, DeliveryChannel::Mta("/usr/sbin/sendmail".into()));
        }
    }
}
