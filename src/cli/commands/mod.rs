//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and validates command-specific arguments
//! 2. Builds the collaborators and hands them to the engine
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `report` talks to the network for version checks, so it builds a tokio
//! runtime and blocks on the session.

mod completion;
mod config_cmd;
mod normalize;
mod report;

pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, path as config_path, set as config_set};
pub use normalize::normalize;
pub use report::report;

use std::path::Path;

use anyhow::Result;

use crate::cli::args::{Command, ConfigAction};
use crate::engine::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context, config: Option<&Path>) -> Result<()> {
    match command {
        Command::Report(args) => report::report(ctx, config, args),
        Command::Normalize(args) => normalize::normalize(ctx, args),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, config, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, config, &key, &value),
            ConfigAction::List => config_cmd::list(ctx, config),
            ConfigAction::Path => config_cmd::path(ctx, config),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
