//! core::bugscript
//!
//! Running package bug scripts and splitting their output.
//!
//! A bug script writes free text to file descriptor 3. It may also emit
//! marked blocks that carry extra headers, pseudo-headers or attachment
//! paths:
//!
//! ```text
//! -- BEGIN HEADERS --
//! X-Debbugs-Cc: someone@example.org
//! -- END HEADERS --
//! -- BEGIN PSEUDOHEADERS --
//! Usertags: crash
//! -- END PSEUDOHEADERS --
//! ```

use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Errors from running a bug script.
#[derive(Debug, Error)]
pub enum BugScriptError {
    #[error("failed to run bug script {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Output of a bug script, split into its blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugScriptOutput {
    /// Exit status (`None` when killed by a signal)
    pub status: Option<i32>,
    /// Header lines
    pub headers: Vec<String>,
    /// Pseudo-header lines
    pub pseudo_headers: Vec<String>,
    /// Free text for the report body
    pub text: String,
    /// Attachment paths
    pub attachments: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Text,
    Headers,
    PseudoHeaders,
    Attachments,
}

impl BugScriptOutput {
    /// Split raw script output into its blocks.
    ///
    /// # Example
    ///
    /// ```
    /// use bugsmith::core::bugscript::BugScriptOutput;
    ///
    /// let out = BugScriptOutput::parse(
    ///     "intro\n-- BEGIN PSEUDOHEADERS --\nUsertags: crash\n-- END PSEUDOHEADERS --\noutro\n",
    /// );
    /// assert_eq!(out.pseudo_headers, vec!["Usertags: crash"]);
    /// assert_eq!(out.text, "intro\noutro\n");
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut out = Self::default();
        let mut block = Block::Text;

        for line in raw.lines() {
            match line {
                "-- BEGIN HEADERS --" => block = Block::Headers,
                "-- BEGIN PSEUDOHEADERS --" => block = Block::PseudoHeaders,
                "-- BEGIN ATTACHMENTS --" => block = Block::Attachments,
                "-- END HEADERS --" | "-- END PSEUDOHEADERS --" | "-- END ATTACHMENTS --" => {
                    block = Block::Text
                }
                _ => match block {
                    Block::Headers => out.headers.push(line.to_string()),
                    Block::PseudoHeaders => out.pseudo_headers.push(line.to_string()),
                    Block::Attachments => {
                        let path = line.trim();
                        if !path.is_empty() {
                            out.attachments.push(path.to_string());
                        }
                    }
                    Block::Text => {
                        out.text.push_str(line);
                        out.text.push('\n');
                    }
                },
            }
        }

        out
    }
}

/// Run a bug script and parse what it writes to descriptor 3.
///
/// The script runs under `sh` with descriptor 3 pointing at the captured
/// stdout and `LC_ALL=C` set. Stdin and stderr stay attached to the
/// terminal so scripts can ask questions.
pub fn run(script: &Path) -> Result<BugScriptOutput, BugScriptError> {
    let output = Command::new("sh")
        .arg("-c")
        .arg("\"$0\" 3>&1 1>&2")
        .arg(script)
        .env("LC_ALL", "C")
        .stdin(Stdio::inherit())
        .stderr(Stdio::inherit())
        .stdout(Stdio::piped())
        .output()
        .map_err(|source| BugScriptError::Spawn {
            path: script.display().to_string(),
            source,
        })?;

    let mut parsed = BugScriptOutput::parse(&String::from_utf8_lossy(&output.stdout));
    parsed.status = output.status.code();
    Ok(parsed)
}
