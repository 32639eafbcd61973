//! Config command - inspect and create the configuration file.

use std::path::Path;

use anyhow::{Result, bail};

use crate::cli::ConfigAction;
use crate::config::Config;

/// Execute the config command.
pub fn cmd_config(action: ConfigAction, config: &Config, db_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Path => println!("{}", Config::path().display()),
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            println!("# effective database: {}", db_path.display());
        }
        ConfigAction::Init { force } => {
            let path = Config::path();
            if path.exists() && !force {
                bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            let new_config = Config {
                database: Some(db_path.to_path_buf()),
                ..config.clone()
            };
            new_config.save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
