mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const APP_DIR: &str = "arcoach";
const CONFIG_FILE: &str = "config.toml";
const SESSIONS_FILE: &str = "sessions.toml";

/// Per-user directory holding the config and the session history.
///
/// Not created here; writers create it on demand.
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("no platform config directory")?;
    Ok(base.join(APP_DIR))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Where finished exercise sessions are appended.
pub fn sessions_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(SESSIONS_FILE))
}

/// Load the user's config, or defaults when none has been written yet.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

/// Load and validate the config at `path`.
///
/// A missing file yields defaults. A file that is unreadable, malformed or
/// out of range is an error naming the path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        info!(?path, "No config found, using defaults");
        return Ok(AppConfig::default());
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = parse_config(&contents).with_context(|| format!("in {}", path.display()))?;
    info!(?path, "Loaded config");
    Ok(config)
}

/// Parse and validate a TOML config document.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(config, &config_path()?)
}

/// Write `config` to `path`, creating the parent directory.
///
/// Refuses to persist a config that would not load back.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Err(e) = config.validate() {
        warn!(?e, "Not saving invalid config");
        return Err(e);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    info!(?path, "Saved config");
    Ok(())
}
