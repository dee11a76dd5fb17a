//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read this configuration file instead of the user one
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Never prompt; use defaults
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// bugsmith - compose and submit distribution bug reports
#[derive(Parser, Debug)]
#[command(name = "bugsmith")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to use
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// False with `--no-interactive` or `--quiet`, otherwise true when
    /// stdin is a terminal.
    pub fn interactive(&self) -> bool {
        if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose and send a bug report
    #[command(
        name = "report",
        long_about = "Compose and send a bug report.\n\n\
            Asks about the problem, looks up the installed package, checks for \
            existing reports and newer versions, opens the draft in your editor \
            and sends the result.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Report a bug in an installed package
    bugsmith report hello

    # File a request for packaging
    bugsmith report wnpp

    # Write the finished report to a file instead of mailing it
    bugsmith report hello --output hello.mail

    # Batch mode with a prepared body
    bugsmith --no-interactive report hello --subject 'crash on start' \\
        --severity important --body-file notes.txt --print"
    )]
    Report(ReportArgs),

    /// Normalize a draft report
    #[command(
        name = "normalize",
        long_about = "Normalize a draft report.\n\n\
            Reads a draft, separates headers, pseudo-headers and body, \
            reconciles repeated fields and prints the canonical report: the \
            pseudo-header block, a blank line and the body.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Normalize a saved draft
    bugsmith normalize draft.txt

    # Read from stdin and emit JSON
    cat draft.txt | bugsmith normalize --json

    # Accept an extra pseudo-header for this run
    bugsmith normalize draft.txt --pseudo-header 'Usertags: crash'"
    )]
    Normalize(NormalizeArgs),

    /// Show configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `report`.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Package to report against
    pub package: Option<String>,

    /// Severity of the problem
    #[arg(long, short = 's')]
    pub severity: Option<String>,

    /// One-line summary of the problem
    #[arg(long, short = 'S')]
    pub subject: Option<String>,

    /// Follow up on an existing bug
    #[arg(long, value_name = "BUG")]
    pub followup: Option<String>,

    /// Tag to add (repeatable)
    #[arg(long = "tag", short = 'T', value_name = "TAG")]
    pub tags: Vec<String>,

    /// Reporter mode: novice, standard, advanced or expert
    #[arg(long)]
    pub mode: Option<String>,

    /// Bug tracking system to report to
    #[arg(long, short = 'B')]
    pub bts: Option<String>,

    /// Use this file as the report body and skip the editor
    #[arg(long, value_name = "FILE")]
    pub body_file: Option<PathBuf>,

    /// Extra mail header, `Name: value` (repeatable)
    #[arg(long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Extra pseudo-header, `Name: value` (repeatable)
    #[arg(long = "pseudo-header", short = 'P', value_name = "HEADER")]
    pub pseudo_headers: Vec<String>,

    /// Do not use the network
    #[arg(long)]
    pub offline: bool,

    /// Do not look for newer versions in the archive
    #[arg(long)]
    pub no_check_available: bool,

    /// Do not list existing reports
    #[arg(long = "no-query-bts")]
    pub no_query_bts: bool,

    /// Submission address: submit, quiet or maintonly
    #[arg(long)]
    pub send_to: Option<String>,

    /// Use STARTTLS with the SMTP server
    #[arg(long)]
    pub smtptls: bool,

    /// SMTP login name
    #[arg(long, value_name = "USER")]
    pub smtpuser: Option<String>,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

/// How the finished report leaves the machine.
#[derive(Args, Debug, Default)]
#[group(multiple = false)]
pub struct DeliveryArgs {
    /// Print the message instead of sending it
    #[arg(long)]
    pub print: bool,

    /// Write the message to a file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Hand the message to a mail user agent
    #[arg(long, value_name = "NAME")]
    pub mua: Option<String>,

    /// Open a mailto: link with the desktop mail handler
    #[arg(long)]
    pub mailto: bool,

    /// Send through this sendmail-compatible program
    #[arg(long, value_name = "PATH")]
    pub mta: Option<PathBuf>,

    /// Submit to this SMTP server instead of the MTA
    #[arg(long, value_name = "HOST[:PORT]")]
    pub smtphost: Option<String>,
}

/// Arguments of `normalize`.
#[derive(Args, Debug, Default)]
pub struct NormalizeArgs {
    /// Draft file; stdin when absent or `-`
    pub file: Option<PathBuf>,

    /// Pseudo-header dialect: debbugs or gnats
    #[arg(long, default_value = "debbugs")]
    pub dialect: String,

    /// Header placed before the draft's own (repeatable)
    #[arg(long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Extra accepted pseudo-header with its default value (repeatable)
    #[arg(long = "pseudo-header", value_name = "HEADER")]
    pub pseudo_headers: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a value in the user configuration file
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
    /// Show where configuration is read from
    Path,
}

/// Supported shells for completion.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
