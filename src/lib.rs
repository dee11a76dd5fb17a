//! bugsmith - compose and submit distribution bug reports
//!
//! bugsmith asks a reporter about a problem, gathers what the local package
//! database knows about the package, checks for existing reports and newer
//! versions, and produces a report whose structured pseudo-header block the
//! tracker can read. The report is then mailed, handed to a mail program,
//! opened as a `mailto:` link or written to a file.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Runs one report session from package name to delivery
//! - [`core`] - Domain types, dialects, draft normalization and configuration
//! - [`pkgdb`] - Installed package metadata
//! - [`versions`] - Archive version lookups and Debian version ordering
//! - [`tracker`] - Existing report lookups
//! - [`requests`] - Request types and the questions each one asks
//! - [`report`] - Draft templates, system information and outgoing messages
//! - [`mailer`] - Delivery channels
//! - [`ui`] - Prompts, editor and output
//!
//! # Normalization Guarantees
//!
//! 1. Any draft text produces a report; normalization never fails
//! 2. Every pseudo-header in the output belongs to the run's vocabulary
//! 3. Non-repeatable pseudo-headers appear at most once
//! 4. Header-like lines with unknown names stay ordinary headers

pub mod cli;
pub mod core;
pub mod engine;
pub mod mailer;
pub mod pkgdb;
pub mod report;
pub mod requests;
pub mod tracker;
pub mod ui;
pub mod versions;
