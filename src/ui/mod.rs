//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Questions and answers (terminal and scripted)
//! - [`output`] - Output formatting and verbosity-aware diagnostics
//! - [`editor`] - External editor for the report draft
//!
//! # Design
//!
//! All output and prompts go through this module so interactive and
//! non-interactive runs behave consistently.

pub mod editor;
pub mod output;
pub mod prompts;
