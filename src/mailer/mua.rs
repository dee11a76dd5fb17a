//! mailer::mua
//!
//! Mail user agents the report can be handed to.
//!
//! File-style agents open a message file for editing; `%s` in the command
//! is replaced with its path, otherwise the path is appended. Mailto-style
//! agents get a `mailto:` URI as their last argument.

use std::process::Command;

use super::mailto::mailto_uri;
use super::{find_executable, DeliveryError, DeliveryReceipt, Transport};
use crate::report::OutgoingMessage;

/// How an agent takes the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuaStyle {
    /// Reads a complete message from a file
    File,
    /// Takes a `mailto:` URI
    Mailto,
}

const MUAS: &[(&str, &str, MuaStyle)] = &[
    ("mutt", "mutt -H", MuaStyle::File),
    ("neomutt", "neomutt -H", MuaStyle::File),
    ("mh", "/usr/bin/mh/comp -use -file", MuaStyle::File),
    ("nmh", "/usr/bin/mh/comp -use -file", MuaStyle::File),
    ("claws-mail", "claws-mail --compose-from-file", MuaStyle::File),
    ("alpine", "alpine -url", MuaStyle::Mailto),
    ("pine", "pine -url", MuaStyle::Mailto),
    ("evolution", "evolution", MuaStyle::Mailto),
    ("kmail", "kmail", MuaStyle::Mailto),
    ("thunderbird", "thunderbird -compose", MuaStyle::Mailto),
    ("sylpheed", "sylpheed --compose", MuaStyle::Mailto),
    ("xdg-email", "xdg-email", MuaStyle::Mailto),
];

/// A known mail user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mua {
    name: &'static str,
    command: &'static str,
    style: MuaStyle,
}

impl Mua {
    /// Look up an agent by name.
    ///
    /// # Example
    ///
    /// ```
    /// use bugsmith::mailer::{Mua, MuaStyle};
    ///
    /// let mutt = Mua::find("mutt").unwrap();
    /// assert_eq!(mutt.style(), MuaStyle::File);
    /// assert_eq!(mutt.send_command("/tmp/report"), vec!["mutt", "-H", "/tmp/report"]);
    /// assert!(Mua::find("outlook").is_none());
    /// ```
    pub fn find(name: &str) -> Option<Mua> {
        MUAS.iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|&(name, command, style)| Mua {
                name,
                command,
                style,
            })
    }

    /// Names of all known agents.
    pub fn names() -> Vec<&'static str> {
        MUAS.iter().map(|(n, _, _)| *n).collect()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn style(&self) -> MuaStyle {
        self.style
    }

    /// Program the agent runs.
    pub fn executable(&self) -> &'static str {
        self.command.split_whitespace().next().unwrap_or(self.command)
    }

    /// Whether the agent's program is installed.
    pub fn is_installed(&self) -> bool {
        find_executable(self.executable()).is_some()
    }

    /// Command line handing `target` (a file path or URI) to the agent.
    pub fn send_command(&self, target: &str) -> Vec<String> {
        let mut argv: Vec<String> = self
            .command
            .split_whitespace()
            .map(|word| word.replace("%s", target))
            .collect();
        if !self.command.contains("%s") {
            argv.push(target.to_string());
        }
        argv
    }
}

/// Transport handing the message to a mail user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuaTransport {
    mua: Mua,
}

impl MuaTransport {
    pub fn new(mua: Mua) -> Self {
        Self { mua }
    }

    fn run(&self, argv: &[String]) -> Result<(), DeliveryError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(DeliveryError::NotInstalled(self.mua.name().to_string()));
        };
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| DeliveryError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(DeliveryError::Failed {
                program: program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

impl Transport for MuaTransport {
    fn name(&self) -> &'static str {
        "mua"
    }

    fn carries_attachments(&self) -> bool {
        self.mua.style() == MuaStyle::File
    }

    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryReceipt, DeliveryError> {
        if !self.mua.is_installed() {
            return Err(DeliveryError::NotInstalled(self.mua.name().to_string()));
        }

        match self.mua.style() {
            MuaStyle::File => {
                let file = super::rescue_copy(message)?;
                let result = self.run(&self.mua.send_command(&file.display().to_string()));
                let _ = std::fs::remove_file(&file);
                result?;
            }
            MuaStyle::Mailto => {
                let uri = mailto_uri(message)?;
                self.run(&self.mua.send_command(&uri))?;
            }
        }

        Ok(DeliveryReceipt {
            channel: self.name(),
            destination: self.mua.name().to_string(),
            submitted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_is_case_insensitive() {
        assert_eq!(Mua::find("NeoMutt").unwrap().name(), "neomutt");
        assert_eq!(Mua::names().len(), 12);
    }

    #[test]
    fn file_style_commands() {
        let mh = Mua::find("mh").unwrap();
        assert_eq!(mh.executable(), "/usr/bin/mh/comp");
        assert_eq!(
            mh.send_command("/tmp/r"),
            vec!["/usr/bin/mh/comp", "-use", "-file", "/tmp/r"]
        );
        assert_eq!(
            Mua::find("claws-mail").unwrap().send_command("/tmp/r"),
            vec!["claws-mail", "--compose-from-file", "/tmp/r"]
        );
    }

    #[test]
    fn mailto_style_commands() {
        let tb = Mua::find("thunderbird").unwrap();
        assert_eq!(tb.style(), MuaStyle::Mailto);
        assert_eq!(
            tb.send_command("mailto:a%40b?subject=x"),
            vec!["thunderbird", "-compose", "mailto:a%40b?subject=x"]
        );
        assert_eq!(
            Mua::find("xdg-email").unwrap().send_command("mailto:x"),
            vec!["xdg-email", "mailto:x"]
        );
    }

    #[test]
    fn only_file_style_agents_carry_attachments() {
        let mutt = MuaTransport::new(Mua::find("mutt").unwrap());
        let alpine = MuaTransport::new(Mua::find("alpine").unwrap());
        assert!(mutt.carries_attachments());
        assert!(!alpine.carries_attachments());
    }

    #[test]
    fn placeholder_is_substituted() {
        let mua = Mua {
            name: "custom",
            command: "composer --file=%s --now",
            style: MuaStyle::File,
        };
        assert_eq!(
            mua.send_command("/tmp/r"),
            vec!["composer", "--file=/tmp/r", "--now"]
        );
    }
}
