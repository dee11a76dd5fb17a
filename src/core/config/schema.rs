//! core::config::schema
//!
//! Configuration schema types.
//!
//! One [`FileConfig`] is read from each scope. Every field is optional so
//! that a user file can override individual system-wide settings.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., `mua` must name a known mail agent, `headers`
//! must be `Name: value` lines). `bts` is checked against the merged
//! configuration, since it may name a system declared in the other scope.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::naming::split_field;
use crate::core::systems::CustomSystem;
use crate::core::types::{Mode, SendTo, Severity};

/// Settings keys accepted by `config get` and `config set`.
pub const KEYS: &[&str] = &[
    "email",
    "realname",
    "replyto",
    "bts",
    "severity",
    "mode",
    "send_to",
    "mta",
    "mua",
    "editor",
    "headers",
    "mirrors",
    "check_available",
    "query_bts",
    "offline",
    "outfile",
    "cc",
    "smtphost",
    "smtptls",
    "smtpuser",
    "smtppasswd",
];

/// Configuration read from one file.
///
/// # Example
///
/// ```toml
/// email = "jane@example.org"
/// realname = "Jane Doe"
/// bts = "debian"
/// mode = "advanced"
/// mua = "mutt"
/// headers = ["X-Debbugs-Cc: jane@example.org"]
///
/// [systems.acme]
/// email = "bugs@acme.example"
/// dialect = "gnats"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Reporter email address
    pub email: Option<String>,
    /// Reporter real name
    pub realname: Option<String>,
    /// Reply-To address
    pub replyto: Option<String>,
    /// Tracker system name
    pub bts: Option<String>,
    /// Default severity
    pub severity: Option<Severity>,
    /// Reporter experience level
    pub mode: Option<Mode>,
    /// Submission address local part
    pub send_to: Option<SendTo>,
    /// Path of a sendmail-compatible program
    pub mta: Option<String>,
    /// Mail user agent used to compose the report
    pub mua: Option<String>,
    /// Editor command for drafts
    pub editor: Option<String>,
    /// Extra header lines added to every report
    pub headers: Option<Vec<String>>,
    /// Package version query endpoints, tried in order
    pub mirrors: Option<Vec<String>>,
    /// Check the archive for newer versions
    pub check_available: Option<bool>,
    /// List open reports before writing a new one
    pub query_bts: Option<bool>,
    /// Skip all network access
    pub offline: Option<bool>,
    /// Save reports to this file instead of sending them
    pub outfile: Option<PathBuf>,
    /// Extra Cc addresses
    pub cc: Option<Vec<String>>,
    /// SMTP server, `host[:port]`; used instead of the MTA
    pub smtphost: Option<String>,
    /// Use STARTTLS with the SMTP server
    pub smtptls: Option<bool>,
    /// SMTP login name
    pub smtpuser: Option<String>,
    /// SMTP password; asked for when a login name is set without one
    pub smtppasswd: Option<String>,
    /// Additional tracker systems
    pub systems: BTreeMap<String, CustomSystem>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, addr) in [("email", &self.email), ("replyto", &self.replyto)] {
            if let Some(addr) = addr {
                if !addr.contains('@') {
                    return Err(ConfigError::InvalidValue(format!(
                        "{key} '{addr}' is not an email address"
                    )));
                }
            }
        }

        if let Some(mua) = &self.mua {
            if crate::mailer::Mua::find(mua).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown mua '{}', must be one of: {}",
                    mua,
                    crate::mailer::Mua::names().join(", ")
                )));
            }
        }

        for (key, value) in [("mta", &self.mta), ("editor", &self.editor)] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!("{key} cannot be empty")));
                }
            }
        }

        if let Some(host) = &self.smtphost {
            crate::mailer::SmtpSettings::parse(host)
                .map_err(|e| ConfigError::InvalidValue(format!("smtphost: {e}")))?;
        }

        for line in self.headers.iter().flatten() {
            if split_field(line).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "header '{line}' is not of the form 'Name: value'"
                )));
            }
        }

        for (name, system) in &self.systems {
            if system.email.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "system '{name}' needs an email address"
                )));
            }
        }

        Ok(())
    }

    /// Render a setting for display, `None` when unset.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "email" => self.email.clone(),
            "realname" => self.realname.clone(),
            "replyto" => self.replyto.clone(),
            "bts" => self.bts.clone(),
            "severity" => self.severity.map(|s| s.to_string()),
            "mode" => self.mode.map(|m| m.to_string()),
            "send_to" => self.send_to.map(|s| s.to_string()),
            "mta" => self.mta.clone(),
            "mua" => self.mua.clone(),
            "editor" => self.editor.clone(),
            "headers" => self.headers.as_ref().map(|v| v.join(", ")),
            "mirrors" => self.mirrors.as_ref().map(|v| v.join(", ")),
            "check_available" => self.check_available.map(|b| b.to_string()),
            "query_bts" => self.query_bts.map(|b| b.to_string()),
            "offline" => self.offline.map(|b| b.to_string()),
            "outfile" => self.outfile.as_ref().map(|p| p.display().to_string()),
            "cc" => self.cc.as_ref().map(|v| v.join(", ")),
            "smtphost" => self.smtphost.clone(),
            "smtptls" => self.smtptls.map(|b| b.to_string()),
            "smtpuser" => self.smtpuser.clone(),
            "smtppasswd" => self.smtppasswd.as_ref().map(|_| "********".to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Set a setting from its command-line spelling.
    ///
    /// List settings take a comma-separated value. The result is not
    /// validated; call [`FileConfig::validate`] afterwards.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |e: String| ConfigError::InvalidValue(format!("{key}: {e}"));
        let text = || Some(value.to_string());
        let list = || {
            Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            )
        };
        let flag = || {
            value
                .parse::<bool>()
                .map(Some)
                .map_err(|e| invalid(e.to_string()))
        };

        match key {
            "email" => self.email = text(),
            "realname" => self.realname = text(),
            "replyto" => self.replyto = text(),
            "bts" => self.bts = text(),
            "severity" => self.severity = Some(value.parse().map_err(|e| invalid(format!("{e}")))?),
            "mode" => self.mode = Some(value.parse().map_err(|e| invalid(format!("{e}")))?),
            "send_to" => self.send_to = Some(value.parse().map_err(|e| invalid(format!("{e}")))?),
            "mta" => self.mta = text(),
            "mua" => self.mua = text(),
            "editor" => self.editor = text(),
            "headers" => self.headers = list(),
            "mirrors" => self.mirrors = list(),
            "check_available" => self.check_available = flag()?,
            "query_bts" => self.query_bts = flag()?,
            "offline" => self.offline = flag()?,
            "outfile" => self.outfile = Some(PathBuf::from(value)),
            "cc" => self.cc = list(),
            "smtphost" => self.smtphost = text(),
            "smtptls" => self.smtptls = flag()?,
            "smtpuser" => self.smtpuser = text(),
            "smtppasswd" => self.smtppasswd = text(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}
