//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! bugsmith has two configuration scopes:
//! - **System**: site-wide settings in `/etc/bugsmith.toml`
//! - **User**: per-user overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. System config file
//! 3. User config file
//! 4. Environment (`DEBEMAIL`, `EMAIL`, `DEBFULLNAME`, `NAME`) for identity
//!    only, when the files leave it unset
//! 5. CLI flags (not handled here)
//!
//! # User Config Locations
//!
//! Searched in order:
//! 1. `--config <path>` (replaces both scopes)
//! 2. `$BUGSMITH_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/bugsmith/config.toml`
//! 4. `~/.bugsmith/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use bugsmith::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("Tracker: {}", config.bts());
//! println!("Mode: {}", config.mode());
//! ```

pub mod schema;

pub use schema::{FileConfig, KEYS};

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::systems::{CustomSystem, TrackerSystem};
use super::types::{Mode, SendTo, Severity};

/// Path of the system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/bugsmith.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("config file '{0}' does not exist")]
    Missing(PathBuf),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Which file a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    System,
    User,
}

impl Scope {
    /// Scope name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Scope::System => "system",
            Scope::User => "user",
        }
    }
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. User config overrides system config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// System-wide configuration
    pub system: FileConfig,
    /// User configuration
    pub user: FileConfig,
    /// Path to the system config file (if loaded)
    system_path: Option<PathBuf>,
    /// Path to the user config file (if loaded)
    user_path: Option<PathBuf>,
}

/// Resolve one optional field, user scope first.
macro_rules! layered {
    ($self:ident, $field:ident) => {
        $self.user.$field.as_ref().or($self.system.$field.as_ref())
    };
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// With `explicit`, only that file is read and it must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// validated. Missing config files are not an error (defaults are used).
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            return Self::load_from(None, Some(path));
        }

        let mut warnings = Vec::new();
        let user = Self::find_user_config(&mut warnings);
        let system = Path::new(SYSTEM_CONFIG_PATH);
        let system = system.exists().then_some(system);

        let mut result = Self::load_from(system, user.as_deref())?;
        result.warnings.extend(warnings);
        Ok(result)
    }

    /// Load configuration from explicit system and user files.
    ///
    /// Files that are given but absent are skipped.
    pub fn load_from(
        system_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let read = |path: Option<&Path>| -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
            match path {
                Some(p) if p.exists() => Ok((Self::read_config(p)?, Some(p.to_path_buf()))),
                _ => Ok((FileConfig::default(), None)),
            }
        };

        let (system, system_path) = read(system_path)?;
        let (user, user_path) = read(user_path)?;

        system.validate()?;
        user.validate()?;

        let config = Config {
            system,
            user,
            system_path,
            user_path,
        };

        // bts may name a system declared only in the other scope
        if let Some(bts) = layered!(config, bts) {
            if TrackerSystem::lookup(bts, &config.systems()).is_none() {
                return Err(ConfigError::InvalidValue(format!("unknown bts '{bts}'")));
            }
        }

        Ok(ConfigLoadResult {
            config,
            warnings: Vec::new(),
        })
    }

    /// Find the user config file.
    fn find_user_config(warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
        // 1. Check $BUGSMITH_CONFIG
        if let Ok(path) = std::env::var("BUGSMITH_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            warnings.push(ConfigWarning {
                message: "BUGSMITH_CONFIG points at a missing file, ignoring it".to_string(),
                path,
            });
        }

        let canonical = Self::user_config_path().ok();

        // 2. Check $XDG_CONFIG_HOME/bugsmith/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("bugsmith/config.toml");
            if path.exists() {
                if let Some(canonical) = canonical.filter(|c| c.exists()) {
                    warnings.push(ConfigWarning {
                        message: format!("Ignoring '{}', shadowed by XDG config", canonical.display()),
                        path: canonical,
                    });
                }
                return Some(path);
            }
        }

        // 3. Check ~/.bugsmith/config.toml
        Self::user_config_path().ok().filter(|p| p.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for user config.
    ///
    /// Returns `~/.bugsmith/config.toml`.
    pub fn user_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".bugsmith/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Uses atomic write
    /// (write to temp file, then rename) to prevent corruption.
    pub fn write_file(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Resolved value of a setting and the scope it came from.
    pub fn get(&self, key: &str) -> Result<Option<(String, Scope)>, ConfigError> {
        if let Some(value) = self.user.get(key)? {
            return Ok(Some((value, Scope::User)));
        }
        Ok(self.system.get(key)?.map(|v| (v, Scope::System)))
    }

    /// Tracker systems declared in either scope, user entries winning.
    pub fn systems(&self) -> BTreeMap<String, CustomSystem> {
        let mut systems = self.system.systems.clone();
        systems.extend(self.user.systems.clone());
        systems
    }

    /// Get the tracker system name.
    ///
    /// Defaults to "debian" if not configured.
    pub fn bts(&self) -> &str {
        layered!(self, bts).map(String::as_str).unwrap_or("debian")
    }

    /// Resolve the configured tracker system.
    pub fn tracker_system(&self) -> Result<TrackerSystem, ConfigError> {
        TrackerSystem::lookup(self.bts(), &self.systems())
            .ok_or_else(|| ConfigError::InvalidValue(format!("unknown bts '{}'", self.bts())))
    }

    /// Default severity.
    pub fn severity(&self) -> Option<Severity> {
        layered!(self, severity).copied()
    }

    /// Reporter experience level, `standard` if unset.
    pub fn mode(&self) -> Mode {
        layered!(self, mode).copied().unwrap_or_default()
    }

    /// Submission address local part, `submit` if unset.
    pub fn send_to(&self) -> SendTo {
        layered!(self, send_to).copied().unwrap_or_default()
    }

    /// Configured MTA program.
    pub fn mta(&self) -> Option<&str> {
        layered!(self, mta).map(String::as_str)
    }

    /// Configured MUA name.
    pub fn mua(&self) -> Option<&str> {
        layered!(self, mua).map(String::as_str)
    }

    /// Configured editor command.
    pub fn editor(&self) -> Option<&str> {
        layered!(self, editor).map(String::as_str)
    }

    /// Reply-To address.
    pub fn replyto(&self) -> Option<&str> {
        layered!(self, replyto).map(String::as_str)
    }

    /// Extra header lines.
    pub fn headers(&self) -> &[String] {
        layered!(self, headers).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Version query endpoints.
    pub fn mirrors(&self) -> &[String] {
        layered!(self, mirrors).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Extra Cc addresses.
    pub fn cc(&self) -> &[String] {
        layered!(self, cc).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Output file for reports.
    pub fn outfile(&self) -> Option<&Path> {
        layered!(self, outfile).map(PathBuf::as_path)
    }

    /// SMTP server, `host[:port]`.
    pub fn smtphost(&self) -> Option<&str> {
        layered!(self, smtphost).map(String::as_str)
    }

    /// Whether to use STARTTLS with the SMTP server. Defaults to `false`.
    pub fn smtptls(&self) -> bool {
        layered!(self, smtptls).copied().unwrap_or(false)
    }

    /// SMTP login name.
    pub fn smtpuser(&self) -> Option<&str> {
        layered!(self, smtpuser).map(String::as_str)
    }

    /// SMTP password.
    pub fn smtppasswd(&self) -> Option<&str> {
        layered!(self, smtppasswd).map(String::as_str)
    }

    /// Whether to check for newer versions. Defaults to `true`.
    pub fn check_available(&self) -> bool {
        layered!(self, check_available).copied().unwrap_or(true)
    }

    /// Whether to list open reports first. Defaults to `true`.
    pub fn query_bts(&self) -> bool {
        layered!(self, query_bts).copied().unwrap_or(true)
    }

    /// Whether to avoid the network. Defaults to `false`.
    pub fn offline(&self) -> bool {
        layered!(self, offline).copied().unwrap_or(false)
    }

    /// Reporter `From` address, using the process environment as fallback.
    pub fn from_address(&self) -> Option<String> {
        self.from_address_with(|key| std::env::var(key).ok())
    }

    /// Reporter `From` address with an explicit environment lookup.
    ///
    /// The address comes from `email`, then `DEBEMAIL`, then `EMAIL`. The
    /// name comes from `realname`, then `DEBFULLNAME`, then `NAME`.
    pub fn from_address_with<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let nonempty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let email = nonempty(layered!(self, email).cloned())
            .or_else(|| nonempty(env("DEBEMAIL")))
            .or_else(|| nonempty(env("EMAIL")))?;

        let name = nonempty(layered!(self, realname).cloned())
            .or_else(|| nonempty(env("DEBFULLNAME")))
            .or_else(|| nonempty(env("NAME")));

        Some(match name {
            Some(name) => format!("{} <{}>", name.trim(), email.trim()),
            None => email.trim().to_string(),
        })
    }

    /// Get the path to the loaded system config file.
    pub fn system_config_loaded_from(&self) -> Option<&Path> {
        self.system_path.as_deref()
    }

    /// Get the path to the loaded user config file.
    pub fn user_config_loaded_from(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_empty_defaults() {
        let result = Config::load_from(None, None).unwrap();
        let config = result.config;

        assert_eq!(config.bts(), "debian");
        assert_eq!(config.mode(), Mode::Standard);
        assert_eq!(config.send_to(), SendTo::Submit);
        assert!(config.check_available());
        assert!(config.query_bts());
        assert!(!config.offline());
        assert!(config.headers().is_empty());
    }

    #[test]
    fn user_overrides_system() {
        let temp = TempDir::new().unwrap();
        let system = write(&temp, "system.toml", "mode = \"novice\"\nmua = \"mutt\"\n");
        let user = write(&temp, "user.toml", "mode = \"expert\"\n");

        let config = Config::load_from(Some(&system), Some(&user)).unwrap().config;
        assert_eq!(config.mode(), Mode::Expert);
        assert_eq!(config.mua(), Some("mutt"));

        assert_eq!(
            config.get("mode").unwrap(),
            Some(("expert".to_string(), Scope::User))
        );
        assert_eq!(
            config.get("mua").unwrap(),
            Some(("mutt".to_string(), Scope::System))
        );
        assert_eq!(config.user_config_loaded_from(), Some(user.as_path()));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "c.toml", "offline = true\n");
        let config = Config::load(Some(&path)).unwrap().config;
        assert!(config.offline());
    }

    #[test]
    fn bts_may_refer_to_system_scope_tracker() {
        let temp = TempDir::new().unwrap();
        let system = write(
            &temp,
            "system.toml",
            "[systems.acme]\nemail = \"bugs@acme.example\"\ndialect = \"gnats\"\n",
        );
        let user = write(&temp, "user.toml", "bts = \"acme\"\n");
        let config = Config::load_from(Some(&system), Some(&user)).unwrap().config;
        let tracker = config.tracker_system().unwrap();
        assert_eq!(tracker.email_template, "bugs@acme.example");
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "c.toml", "colour = \"blue\"\n");
        let result = Config::load_from(None, Some(&path));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_value_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "c.toml", "bts = \"nowhere\"\n");
        assert!(Config::load_from(None, Some(&path)).is_err());
    }

    #[test]
    fn write_file_atomic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");
        let config = FileConfig {
            email: Some("jane@example.org".into()),
            ..Default::default()
        };

        Config::write_file(&path, &config).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(None, Some(&path)).unwrap().config;
        assert_eq!(loaded.user, config);
    }

    #[test]
    fn from_address_prefers_config() {
        let config = Config {
            user: FileConfig {
                email: Some("jane@example.org".into()),
                realname: Some("Jane Doe".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let addr = config.from_address_with(|_| Some("env@example.org".into()));
        assert_eq!(addr.as_deref(), Some("Jane Doe <jane@example.org>"));
    }

    #[test]
    fn from_address_falls_back_to_environment() {
        let config = Config::default();
        let addr = config.from_address_with(|key| match key {
            "EMAIL" => Some("env@example.org".into()),
            "NAME" => Some("Env User".into()),
            _ => None,
        });
        assert_eq!(addr.as_deref(), Some("Env User <env@example.org>"));
        assert_eq!(config.from_address_with(|_| None), None);
    }
}
