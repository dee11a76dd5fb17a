//! config command - Get, set, or list configuration values

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::core::config::{Config, KEYS};
use crate::engine::Context;
use crate::ui::output;

fn load(ctx: &Context, explicit: Option<&Path>) -> Result<Config> {
    let result = Config::load(explicit).context("Failed to load configuration")?;
    for warning in &result.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            ctx.verbosity(),
        );
    }
    Ok(result.config)
}

/// Get a configuration value.
pub fn get(ctx: &Context, explicit: Option<&Path>, key: &str) -> Result<()> {
    let config = load(ctx, explicit)?;
    if let Some((value, _)) = config.get(key)? {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value in the user file (or the `--config` file).
pub fn set(ctx: &Context, explicit: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let target: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let config = load(ctx, None)?;
            match config.user_config_loaded_from() {
                Some(path) => path.to_path_buf(),
                None => Config::user_config_path()?,
            }
        }
    };

    let mut file = if target.exists() {
        Config::load_from(None, Some(&target))
            .context("Failed to read the configuration file")?
            .config
            .user
    } else {
        Default::default()
    };
    file.set(key, value)?;
    Config::write_file(&target, &file).context("Failed to write config")?;

    output::success(format!("Set {} = {} in {}", key, value, target.display()), ctx.verbosity());
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context, explicit: Option<&Path>) -> Result<()> {
    let config = load(ctx, explicit)?;

    for key in KEYS {
        match config.get(key)? {
            Some((value, scope)) => println!("{} = {} ({})", key, value, scope.name()),
            None => println!("{} = (not set)", key),
        }
    }
    for (name, system) in config.systems() {
        println!("systems.{} = {}", name, system.email);
    }

    Ok(())
}

/// Show where configuration comes from.
pub fn path(ctx: &Context, explicit: Option<&Path>) -> Result<()> {
    let config = load(ctx, explicit)?;

    let describe = |path: Option<&Path>| {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    };
    println!("system: {}", describe(config.system_config_loaded_from()));
    println!("user: {}", describe(config.user_config_loaded_from()));
    if explicit.is_none() {
        println!("default user file: {}", Config::user_config_path()?.display());
    }

    Ok(())
}
