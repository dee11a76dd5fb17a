//! mailer
//!
//! Delivering a finished report.
//!
//! # Architecture
//!
//! The [`Transport`] trait hides how a message leaves the machine. The
//! session asks [`create_transport`] for the transport matching the chosen
//! [`DeliveryChannel`] and never names an implementation directly.
//!
//! | Channel | Behavior |
//! |---------|----------|
//! | `Mta` | pipe into a `sendmail`-compatible program, keep a rescue copy on failure |
//! | `Smtp` | submit to an SMTP server, keep a rescue copy on failure |
//! | `Mua` | hand the message to a mail composer (file or `mailto:` style) |
//! | `Mailto` | open a `mailto:` URI with the desktop handler |
//! | `File` | write to a file, keeping the previous one as `<file>~` |
//! | `Print` | write to standard output |
//!
//! # Modules
//!
//! - `sendmail`: MTA transport
//! - `smtp`: SMTP transport
//! - `mua`: mail user agent table and transport
//! - [`mailto`]: `mailto:` URI construction and transport
//! - `file`: file and print transports
//! - [`mock`]: capturing transport for tests

mod file;
pub mod mailto;
pub mod mock;
mod mua;
mod sendmail;
mod smtp;

pub use file::{backup_path, FileTransport, PrintTransport};
pub use mailto::{mailto_uri, MailtoTransport};
pub use mua::{Mua, MuaStyle, MuaTransport};
pub use sendmail::{MtaTransport, DEFAULT_MTA, MTA_ARGS};
pub use smtp::{SmtpSettings, SmtpTransport, DEFAULT_SMTP_PORT};

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::report::OutgoingMessage;

/// Errors from delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("'{program}' exited with {status}")]
    Failed { program: String, status: String },

    #[error("{error}; a copy of the report was saved to {}", .rescue.display())]
    Rescued {
        error: Box<DeliveryError>,
        rescue: PathBuf,
    },

    #[error("mail agent '{0}' is not installed")]
    NotInstalled(String),

    #[error("message does not fit into a mailto: URI")]
    TooLong,

    #[error("failed to open mailto: URI: {0}")]
    Open(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("failed to write message: {0}")]
    Io(#[from] io::Error),
}

impl DeliveryError {
    /// Path of the rescue copy, if one was written.
    pub fn rescue_path(&self) -> Option<&PathBuf> {
        match self {
            DeliveryError::Rescued { rescue, .. } => Some(rescue),
            _ => None,
        }
    }
}

/// Outcome of a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Transport that handled the message
    pub channel: &'static str,
    /// Where the message went: program, file or URI target
    pub destination: String,
    /// Whether the message was actually submitted (not just handed over)
    pub submitted: bool,
}

/// Something that can deliver a message.
pub trait Transport {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Deliver the message.
    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError>;

    /// Whether attachments reach the recipient.
    fn carries_attachments(&self) -> bool {
        true
    }
}

/// How the report should leave the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryChannel {
    /// Mail transfer agent program
    Mta(PathBuf),
    /// SMTP server
    Smtp(SmtpSettings),
    /// Mail user agent
    Mua(Mua),
    /// Desktop `mailto:` handler
    Mailto,
    /// Write to a file
    File(PathBuf),
    /// Write to standard output
    Print,
}

/// Create the transport for a channel.
///
/// # Example
///
/// ```
/// use bugsmith::mailer::{create_transport, DeliveryChannel};
///
/// let transport = create_transport(DeliveryChannel::Print).unwrap();
/// assert_eq!(transport.name(), "print");
/// ```
///
/// # Errors
///
/// Returns `DeliveryError::Smtp` when the SMTP client cannot be set up.
pub fn create_transport(channel: DeliveryChannel) -> Result<Box<dyn Transport>, DeliveryError> {
    Ok(match channel {
        DeliveryChannel::Mta(path) => Box::new(MtaTransport::new(path)),
        DeliveryChannel::Smtp(settings) => Box::new(SmtpTransport::connect(&settings)?),
        DeliveryChannel::Mua(mua) => Box::new(MuaTransport::new(mua)),
        DeliveryChannel::Mailto => Box::new(MailtoTransport::desktop()),
        DeliveryChannel::File(path) => Box::new(FileTransport::new(path)),
        DeliveryChannel::Print => Box::new(PrintTransport),
    })
}

/// Save the rendered message to a temporary file that outlives the process.
pub(crate) fn rescue_copy(message: &OutgoingMessage) -> io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("bugsmith-")
        .suffix(".mail")
        .tempfile()?;
    file.write_all(message.render().as_bytes())?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// Attach a rescue copy to a delivery error when one can be written.
pub(crate) fn with_rescue(message: &OutgoingMessage, error: DeliveryError) -> DeliveryError {
    match rescue_copy(message) {
        Ok(rescue) => DeliveryError::Rescued {
            error: Box::new(error),
            rescue,
        },
        Err(_) => error,
    }
}

/// Find an executable in `PATH`. Paths containing `/` are checked as given.
pub(crate) fn find_executable(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return path.is_file().then_some(path);
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
