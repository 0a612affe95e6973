//! Keybinding configuration loader
//!
//! Loads keybinding configuration from TOML files with fallback to defaults.

use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::keybindings::schema::KeybindingConfig;

/// Default keybindings shipped with the binary.
const DEFAULT_CONFIG: &str = include_str!("../../config/keybindings.toml");

/// Error type for keybinding loading operations
#[derive(Debug)]
pub enum LoadError {
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ReadError { path, source } => {
                write!(
                    f,
                    "Failed to read keybindings from '{}': {}",
                    path.display(),
                    source
                )
            }
            LoadError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse keybindings from '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::ReadError { source, .. } => Some(source),
            LoadError::ParseError { source, .. } => Some(source),
        }
    }
}

impl LoadError {
    fn read_err(path: &Path, source: std::io::Error) -> Self {
        LoadError::ReadError {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse_err(path: &Path, source: toml::de::Error) -> Self {
        LoadError::ParseError {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load keybindings from the specified path.
///
/// A missing file falls back to the bundled defaults; a present but
/// malformed file is an error rather than a silent fallback.
pub fn load_keybindings(path: &Path) -> Result<KeybindingConfig, LoadError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(|e| LoadError::parse_err(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default_config()),
        Err(e) => Err(LoadError::read_err(path, e)),
    }
}

/// The bundled default configuration.
pub fn default_config() -> KeybindingConfig {
    toml::from_str(DEFAULT_CONFIG).expect("bundled keybinding config is valid")
}

/// Location of the user override file, in the platform config dir.
pub fn user_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("teamboard");
    path.push("keybindings.toml");
    Some(path)
}
