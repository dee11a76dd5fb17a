//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Every question the tool asks goes through the [`Interaction`] trait so
//! the session can run against a terminal or a script. In non-interactive
//! mode, questions with a default answer get that default; questions
//! without one fail with [`PromptError::NotInteractive`].
//!
//! # Example
//!
//! ```
//! use bugsmith::ui::prompts::{Choice, Interaction, ScriptedUi};
//!
//! let mut ui = ScriptedUi::new(["crash on start", "y", "g"]);
//! assert_eq!(ui.ask_text("Subject?", None).unwrap(), "crash on start");
//! assert!(ui.ask_yes_no("Continue?", false).unwrap());
//!
//! let choices = [Choice::new("g", "grave"), Choice::new("n", "normal")];
//! assert_eq!(ui.ask_choice("Severity?", &choices, Some("n")).unwrap(), "g");
//! ```

use std::collections::VecDeque;
use std::io::{self, BufRead, Stdin, Stdout, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("invalid answer '{0}'")]
    InvalidAnswer(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(e: io::Error) -> Self {
        PromptError::IoError(e.to_string())
    }
}

/// One option of a menu question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// What the user types
    pub key: String,
    /// What the option means
    pub description: String,
}

impl Choice {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Question-and-answer channel with the reporter.
pub trait Interaction {
    /// Ask for free text. An empty answer yields `default` when one is given.
    fn ask_text(&mut self, prompt: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Ask to pick one of `choices`; returns the chosen key.
    fn ask_choice(
        &mut self,
        prompt: &str,
        choices: &[Choice],
        default: Option<&str>,
    ) -> Result<String, PromptError>;

    /// Ask a yes/no question.
    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError>;

    /// Show text to the reporter.
    fn display(&mut self, text: &str);
}

/// Parse a yes/no answer. Empty means the default.
fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Match an answer against the menu keys, case-insensitively.
fn match_choice<'a>(answer: &str, choices: &'a [Choice], default: Option<&'a str>) -> Option<&'a str> {
    let answer = answer.trim();
    if answer.is_empty() {
        return default;
    }
    choices
        .iter()
        .find(|c| c.key.eq_ignore_ascii_case(answer))
        .map(|c| c.key.as_str())
}

/// Interaction over a terminal (or any reader and writer).
pub struct TerminalUi<R, W> {
    input: R,
    output: W,
    interactive: bool,
}

impl TerminalUi<io::StdinLock<'static>, Stdout> {
    /// Terminal UI over standard input and output.
    pub fn stdio(interactive: bool) -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout(), interactive)
    }
}

impl<R: BufRead, W: Write> TerminalUi<R, W> {
    pub fn new(input: R, output: W, interactive: bool) -> Self {
        Self {
            input,
            output,
            interactive,
        }
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{} ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

impl<R: BufRead, W: Write> Interaction for TerminalUi<R, W> {
    fn ask_text(&mut self, prompt: &str, default: Option<&str>) -> Result<String, PromptError> {
        if !self.interactive {
            return default.map(str::to_string).ok_or(PromptError::NotInteractive);
        }

        let prompt = match default {
            Some(d) if !d.is_empty() => format!("{} [{}]", prompt, d),
            _ => prompt.to_string(),
        };
        let answer = self.read_answer(&prompt)?;
        match default {
            Some(d) if answer.trim().is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn ask_choice(
        &mut self,
        prompt: &str,
        choices: &[Choice],
        default: Option<&str>,
    ) -> Result<String, PromptError> {
        if !self.interactive {
            return default.map(str::to_string).ok_or(PromptError::NotInteractive);
        }

        let width = choices.iter().map(|c| c.key.len()).max().unwrap_or(0);
        for (i, choice) in choices.iter().enumerate() {
            writeln!(
                self.output,
                "{:>2} {:<width$}  {}",
                i + 1,
                choice.key,
                choice.description,
                width = width
            )?;
        }

        let keys: Vec<&str> = choices.iter().map(|c| c.key.as_str()).collect();
        let prompt = match default {
            Some(d) => format!("{} ({}) [{}]", prompt, keys.join("/"), d),
            None => format!("{} ({})", prompt, keys.join("/")),
        };

        loop {
            let answer = self.read_answer(&prompt)?;
            if let Some(key) = match_choice(&answer, choices, default) {
                return Ok(key.to_string());
            }
            if let Some(choice) = answer
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| choices.get(i))
            {
                return Ok(choice.key.clone());
            }
            writeln!(self.output, "Please choose one of the listed options.")?;
        }
    }

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError> {
        if !self.interactive {
            return Ok(default);
        }

        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.read_answer(&format!("{} {}", prompt, hint))?;
            if let Some(yes) = parse_yes_no(&answer, default) {
                return Ok(yes);
            }
            writeln!(self.output, "Please answer y or n.")?;
        }
    }

    fn display(&mut self, text: &str) {
        let _ = writeln!(self.output, "{}", text);
    }
}

/// Interaction that replays prepared answers.
///
/// Answers are consumed in order. An empty answer selects the question's
/// default. Once the script runs out, questions with a default get it and
/// the rest fail with [`PromptError::NotInteractive`]. Every prompt and
/// displayed text is kept in a transcript.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedUi {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Prompts asked and text displayed so far.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, prompt: &str) -> Option<String> {
        self.transcript.push(prompt.to_string());
        self.answers.pop_front()
    }
}

impl Interaction for ScriptedUi {
    fn ask_text(&mut self, prompt: &str, default: Option<&str>) -> Result<String, PromptError> {
        match (self.next_answer(prompt), default) {
            (Some(a), Some(d)) if a.is_empty() => Ok(d.to_string()),
            (Some(a), _) => Ok(a),
            (None, Some(d)) => Ok(d.to_string()),
            (None, None) => Err(PromptError::NotInteractive),
        }
    }

    fn ask_choice(
        &mut self,
        prompt: &str,
        choices: &[Choice],
        default: Option<&str>,
    ) -> Result<String, PromptError> {
        let Some(answer) = self.next_answer(prompt) else {
            return default.map(str::to_string).ok_or(PromptError::NotInteractive);
        };
        match_choice(&answer, choices, default)
            .map(str::to_string)
            .ok_or(PromptError::InvalidAnswer(answer))
    }

    fn ask_yes_no(&mut self, prompt: &str, default: bool) -> Result<bool, PromptError> {
        let Some(answer) = self.next_answer(prompt) else {
            return Ok(default);
        };
        parse_yes_no(&answer, default).ok_or(PromptError::InvalidAnswer(answer))
    }

    fn display(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }
}
