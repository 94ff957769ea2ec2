use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;

/// Dotfolder name under `$HOME`.
const DOTFOLDER: &str = ".chainfolio";

/// Config file name inside the dotfolder.
const CONFIG_FILE: &str = "config.toml";

/// Required subdirectories inside the dotfolder.
/// Resolve the root path: `$HOME/.chainfolio/`.
pub fn root_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DOTFOLDER))
}

/// Resolve a path relative to the dotfolder root.
pub fn resolve(relative: &str) -> Result<PathBuf> {
    Ok(root_dir()?.join(relative))
}

/// `$HOME/.chainfolio/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    resolve(CONFIG_FILE)
}

/// Ensure the dotfolder exists with a seeded `config.toml`.
/// Idempotent; safe to call on every launch.
///
/// ```text
/// $HOME/.chainfolio/
/// └── config.toml
/// ```
pub fn init_workspace() -> Result<()> {
    init_workspace_at(&root_dir()?)
}

pub fn init_workspace_at(root: &Path) -> Result<()> {
    if !root.exists() {
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;
        info!("created directory: {}", root.display());
    }

    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        save_config_to(&config_path, &AppConfig::default())?;
        info!("created default config: {}", config_path.display());
    }

    info!("workspace initialized at {}", root.display());
    Ok(())
}

/// Load the config from disk, migrating outdated files.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

/// Load a config file. If it no longer matches the schema, regenerate
/// with defaults while preserving `general.default_address`.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match AppConfig::from_toml_str(&raw) {
        Ok(config) => Ok(config),
        Err(e) => {
            info!(error = %e, "config.toml outdated, migrating to new schema");
            let mut new_config = AppConfig::default();

            if let Ok(old) = raw.parse::<toml::Table>() {
                if let Some(general) = old.get("general").and_then(|v| v.as_table()) {
                    if let Some(address) = general.get("default_address").and_then(|v| v.as_str()) {
                        new_config.general.default_address = address.to_string();
                    }
                    if let Some(verbose) = general.get("verbose").and_then(|v| v.as_bool()) {
                        new_config.general.verbose = verbose;
                    }
                }
            }

            save_config_to(path, &new_config)?;
            info!("config migrated successfully");
            Ok(new_config)
        }
    }
}

/// Write the config back to disk.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let toml_str = config
        .to_toml_string()
        .context("Failed to serialize config")?;
    fs::write(path, &toml_str)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
