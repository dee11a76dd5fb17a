//! core
//!
//! Core domain types, report normalization and configuration.
//!
//! # Modules
//!
//! - [`naming`] - Field name capitalization and `Name: value` splitting
//! - [`dialect`] - Pseudo-header vocabularies and field policies
//! - [`normalize`] - Draft classification and pseudo-header reconciliation
//! - [`types`] - Strong types: PackageName, Severity, BugNumber, etc.
//! - [`systems`] - Bug tracking systems
//! - [`control`] - Per-package control files
//! - [`bugscript`] - Per-package bug scripts
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Normalization is pure and total: any draft yields a report
//! - Schemas are strict and self-describing

pub mod bugscript;
pub mod config;
pub mod control;
pub mod dialect;
pub mod naming;
pub mod normalize;
pub mod systems;
pub mod types;
