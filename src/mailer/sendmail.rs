//! mailer::sendmail
//!
//! Submission through a `sendmail`-compatible MTA.
//!
//! The rendered message is piped into `<mta> -t -oi -oem`: recipients are
//! read from the headers, a lone `.` line does not end the message, and
//! errors are mailed back. If anything goes wrong the message is saved to a
//! temporary file and the error names it.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{with_rescue, DeliveryError, DeliveryReceipt, Transport};
use crate::report::OutgoingMessage;

/// MTA used when none is configured.
pub const DEFAULT_MTA: &str = "/usr/sbin/sendmail";

/// Arguments passed to the MTA.
pub const MTA_ARGS: &[&str] = &["-t", "-oi", "-oem"];

/// Transport piping into an MTA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtaTransport {
    program: PathBuf,
}

impl MtaTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn submit(&self, message: &OutgoingMessage) -> Result<(), DeliveryError> {
        let program = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .args(MTA_ARGS)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| DeliveryError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.render().as_bytes())?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(DeliveryError::Failed {
                program,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MtaTransport {
    fn default() -> Self {
        Self::new(DEFAULT_MTA)
    }
}

impl Transport for MtaTransport {
    fn name(&self) -> &'static str {
        "mta"
    }

    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError> {
        self.submit(message).map_err(|e| with_rescue(message, e))?;
        Ok(DeliveryReceipt {
            channel: self.name(),
            destination: message.recipients().join(", "),
            submitted: true,
        })
    }
}
