//! cli
//!
//! Command-line interface layer for bugsmith.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT compose reports itself
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, wires real
//! collaborators together and hands them to [`crate::engine`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        offline: false,
    };

    commands::dispatch(cli.command, &ctx, cli.config.as_deref())
}
