//! Configuration file location for the CLI.

use crate::error::{CliError, Result};
use docex_orchestrator::Settings;
use std::path::{Path, PathBuf};

/// Default configuration file path (`<config dir>/docex/config.toml`).
pub fn default_path() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| CliError::InvalidInput("Could not find a configuration directory".into()))?;
    Ok(base.join("docex").join("config.toml"))
}

/// Pick the file to load: an explicit path, else the default path if it exists.
pub fn resolve(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    let path = default_path()?;
    Ok(path.exists().then_some(path))
}

/// Load effective settings: file, then environment overrides.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = resolve(explicit)?;
    Ok(Settings::load(path.as_deref())?)
}

/// Write the default configuration to `path`.
pub fn write_default(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, Settings::default().to_toml()?)?;
    Ok(())
}
