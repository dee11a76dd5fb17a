//! report
//!
//! Report assembly: the editable draft on the way in, the outgoing mail
//! message on the way out.
//!
//! # Modules
//!
//! - [`template`]: blank report generation
//! - [`sysinfo`]: system information and dependency version sections
//! - [`message`]: outgoing message headers and rendering

pub mod message;
pub mod sysinfo;
pub mod template;

pub use message::{Attachment, MessageParts, OutgoingMessage};
pub use sysinfo::{dependency_section, SystemInfo};
pub use template::{blank_report, TemplateInput, REPORTER_GUIDE};
