//! ui::editor
//!
//! Editing the report draft in an external editor.
//!
//! # Design
//!
//! The draft is written to a temporary file, the editor runs on it, and the
//! file is read back. The temporary file is removed when it goes out of
//! scope. The editor is resolved in this order:
//!
//! 1. the `editor` configuration key
//! 2. `$VISUAL`
//! 3. `$EDITOR`
//! 4. `sensible-editor`
//!
//! The editor command may carry arguments (`emacs -nw`); the file path is
//! appended as the last argument.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

use thiserror::Error;

/// Editor used when nothing is configured.
pub const FALLBACK_EDITOR: &str = "sensible-editor";

/// Errors from running the editor.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("failed to start editor '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("editor '{program}' exited with {status}")]
    Failed { program: String, status: String },

    #[error("editor command is empty")]
    Empty,

    #[error("draft file error: {0}")]
    Io(#[from] io::Error),
}

/// Something that lets the reporter change the draft.
pub trait Editor {
    /// Edit `text` and return the result.
    fn edit(&mut self, text: &str) -> Result<String, EditorError>;
}

/// Runs an external editor program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// Use the given command line.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Resolve the editor from configuration and the environment.
    pub fn resolve(configured: Option<&str>) -> Self {
        Self::resolve_with(configured, |key| std::env::var(key).ok())
    }

    /// Resolve with a custom environment lookup.
    ///
    /// # Example
    ///
    /// ```
    /// use bugsmith::ui::editor::ExternalEditor;
    ///
    /// let editor = ExternalEditor::resolve_with(None, |key| match key {
    ///     "EDITOR" => Some("nano".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(editor.command(), "nano");
    /// ```
    pub fn resolve_with<F>(configured: Option<&str>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let command = configured
            .map(str::to_string)
            .or_else(|| env("VISUAL"))
            .or_else(|| env("EDITOR"))
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self { command }
    }

    /// Command line that will be run.
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Editor for ExternalEditor {
    fn edit(&mut self, text: &str) -> Result<String, EditorError> {
        let mut words = self.command.split_whitespace();
        let program = words.next().ok_or(EditorError::Empty)?;

        let mut file = tempfile::Builder::new()
            .prefix("bugsmith-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        let status = Command::new(program)
            .args(words)
            .arg(file.path())
            .status()
            .map_err(|source| EditorError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(EditorError::Failed {
                program: program.to_string(),
                status: status.to_string(),
            });
        }

        let bytes = fs::read(file.path())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Editor that applies prepared edits, for tests and batch runs.
///
/// Each call consumes one entry: `Some(text)` replaces the draft, `None`
/// leaves it unchanged. When the script runs out the draft is returned
/// unchanged.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    edits: VecDeque<Option<String>>,
    seen: Vec<String>,
}

impl ScriptedEditor {
    pub fn new<I>(edits: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        Self {
            edits: edits.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    /// Editor that replaces the draft once.
    pub fn replacing(text: impl Into<String>) -> Self {
        Self::new([Some(text.into())])
    }

    /// Drafts handed to the editor so far.
    pub fn seen(&self) -> &[String] {
        &self.seen
    }
}

impl Editor for ScriptedEditor {
    fn edit(&mut self, text: &str) -> Result<String, EditorError> {
        self.seen.push(text.to_string());
        Ok(self
            .edits
            .pop_front()
            .flatten()
            .unwrap_or_else(|| text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_order() {
        let env = |key: &str| match key {
            "VISUAL" => Some("vim".to_string()),
            "EDITOR" => Some("nano".to_string()),
            _ => None,
        };
        assert_eq!(ExternalEditor::resolve_with(Some("emacs -nw"), env).command(), "emacs -nw");
        assert_eq!(ExternalEditor::resolve_with(None, env).command(), "vim");
        assert_eq!(
            ExternalEditor::resolve_with(None, |_| None).command(),
            FALLBACK_EDITOR
        );
    }

    #[test]
    fn blank_editor_falls_back() {
        let editor = ExternalEditor::resolve_with(Some("  "), |_| None);
        assert_eq!(editor.command(), FALLBACK_EDITOR);
    }

    #[cfg(unix)]
    #[test]
    fn true_leaves_text_unchanged() {
        let mut editor = ExternalEditor::new("true");
        assert_eq!(editor.edit("Subject: x\n\nbody\n").unwrap(), "Subject: x\n\nbody\n");
    }

    #[cfg(unix)]
    #[test]
    fn failing_editor_is_error() {
        let mut editor = ExternalEditor::new("false");
        assert!(matches!(editor.edit("x"), Err(EditorError::Failed { .. })));
    }

    #[test]
    fn missing_editor_is_spawn_error() {
        let mut editor = ExternalEditor::new("bugsmith-no-such-editor-binary");
        assert!(matches!(editor.edit("x"), Err(EditorError::Spawn { .. })));
    }

    #[test]
    fn scripted_editor_applies_edits_in_order() {
        let mut editor = ScriptedEditor::new([None, Some("new".to_string())]);
        assert_eq!(editor.edit("old").unwrap(), "old");
        assert_eq!(editor.edit("old").unwrap(), "new");
        assert_eq!(editor.edit("again").unwrap(), "again");
        assert_eq!(editor.seen().len(), 3);
    }
}
