//! # Configuration File Loading
//!
//! Loads configuration from TOML or YAML files, detecting the format from the
//! file extension.

use crate::config::OrionConfig;
use std::path::Path;

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Cannot read config file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error
    },

    #[error("Failed to parse TOML in {path}: {reason}")]
    TomlParse { path: String, reason: String },

    #[error("Failed to parse YAML in {path}: {reason}")]
    YamlParse { path: String, reason: String },

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String)
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path).map_err(|source| ConfigFileError::Unreadable {
        path: path.display().to_string(),
        source
    })
}

pub fn load_from_toml(path: &Path) -> Result<OrionConfig, ConfigFileError> {
    toml::from_str(&read(path)?).map_err(|e| ConfigFileError::TomlParse {
        path: path.display().to_string(),
        reason: e.to_string()
    })
}

pub fn load_from_yaml(path: &Path) -> Result<OrionConfig, ConfigFileError> {
    serde_yaml::from_str(&read(path)?).map_err(|e| ConfigFileError::YamlParse {
        path: path.display().to_string(),
        reason: e.to_string()
    })
}

/// Picks the parser from the extension: `.toml`, `.yaml` or `.yml`.
pub fn load_from_file(path: &Path) -> Result<OrionConfig, ConfigFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or(ConfigFileError::NoExtension)?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigFileError::UnsupportedFormat(other.to_string()))
    }
}
