//! Loading of session configuration and map files.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use courier_chase_core::TraversabilityMask;
use courier_chase_session::SessionConfig;

/// Reads a TOML session configuration from disk.
pub(crate) fn load_config(path: &Path) -> Result<SessionConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_config(&contents)
        .with_context(|| format!("invalid config file at {}", path.display()))
}

/// Reads an ASCII map where `.` marks open cells and `#` blocked ones.
pub(crate) fn load_map(path: &Path) -> Result<TraversabilityMask> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read map file at {}", path.display()))?;
    TraversabilityMask::from_ascii(&contents)
        .with_context(|| format!("failed to parse map at {}", path.display()))
}

fn parse_config(contents: &str) -> Result<SessionConfig> {
    let config: SessionConfig =
        toml::from_str(contents).context("failed to parse session config toml contents")?;
    if config.columns == 0 || config.rows == 0 {
        bail!(
            "grid dimensions must be positive, got {}x{}",
            config.columns,
            config.rows
        );
    }
    Ok(config)
}
