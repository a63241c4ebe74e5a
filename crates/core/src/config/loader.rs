//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist; without one the standard locations are
    /// searched and defaults apply when none is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };
        schema.validate()?;

        tracing::debug!(path = ?config_path, "Configuration loaded");

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [".signkit.toml", "signkit.toml", ".config/signkit.toml"];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::from(e).with_context(format!("While parsing {}", path.display()))
    })
}
