//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config;
use crate::error::Result;
use crate::output::{Formatter, OutputFormat};
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    explicit: Option<&Path>,
    format: OutputFormat,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let settings = config::load_settings(explicit)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
                _ => print!("{}", settings.to_toml()?),
            }
        }
        ConfigAction::Path => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => config::default_path()?,
            };
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => config::default_path()?,
            };
            config::write_default(&path, force)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
    }
    Ok(())
}
