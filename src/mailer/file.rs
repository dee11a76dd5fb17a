//! mailer::file
//!
//! Writing the message to a file or to standard output.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{DeliveryError, DeliveryReceipt, Transport};
use crate::report::OutgoingMessage;

/// `<file>~`, where an existing output file is moved before writing.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push("~");
    PathBuf::from(name)
}

/// Transport writing the message to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Transport for FileTransport {
    fn name(&self) -> &'static str {
        "file"
    }

    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError> {
        if self.path.exists() {
            fs::rename(&self.path, backup_path(&self.path))?;
        }
        fs::write(&self.path, message.render())?;
        Ok(DeliveryReceipt {
            channel: self.name(),
            destination: self.path.display().to_string(),
            submitted: false,
        })
    }
}

/// Transport printing the message.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintTransport;

impl Transport for PrintTransport {
    fn name(&self) -> &'static str {
        "print"
    }

    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(message.render().as_bytes())?;
        stdout.flush()?;
        Ok(DeliveryReceipt {
            channel: self.name(),
            destination: "stdout".to_string(),
            submitted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::NormalizedReport;
    use crate::report::MessageParts;
    use assert_fs::prelude::*;

    fn message(subject: &str) -> OutgoingMessage {
        OutgoingMessage::assemble(
            MessageParts {
                subject: subject.into(),
                ..Default::default()
            },
            &NormalizedReport::default(),
        )
    }

    #[test]
    fn backup_name() {
        assert_eq!(backup_path(Path::new("/tmp/report.txt")), PathBuf::from("/tmp/report.txt~"));
    }

    #[test]
    fn writes_new_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let out = temp.child("report.mail");

        let receipt = FileTransport::new(out.path()).deliver(&message("first")).unwrap();

        assert_eq!(receipt.channel, "file");
        out.assert(predicates::str::contains("Subject: first"));
        temp.child("report.mail~").assert(predicates::path::missing());
    }

    #[test]
    fn existing_file_is_backed_up() {
        let temp = assert_fs::TempDir::new().unwrap();
        let out = temp.child("report.mail");
        out.write_str("old contents").unwrap();

        FileTransport::new(out.path()).deliver(&message("second")).unwrap();

        out.assert(predicates::str::contains("Subject: second"));
        temp.child("report.mail~").assert("old contents");
    }
}
