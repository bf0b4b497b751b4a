//! # Configuration Precedence
//!
//! Resolves the effective configuration.
//!
//! # Precedence Order
//! 1. Environment variables (highest priority)
//! 2. Configuration file (`ORION_CONFIG`)
//! 3. Default values (lowest priority)

use crate::config::OrionConfig;
use crate::file_loader::{ConfigFileError, load_from_file};
use crate::loader::{EnvError, apply_env_overrides_with};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Environment variable naming the optional configuration file.
pub const CONFIG_PATH_VAR: &str = "ORION_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] ConfigFileError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors)
}

/// Resolves configuration from the process environment.
pub fn load_config() -> Result<OrionConfig, ConfigError> {
    resolve_config_with(|key| std::env::var(key).ok())
}

/// Resolves configuration through `lookup`: defaults, then the file named by
/// `ORION_CONFIG` (if any), then variable overrides, then validation.
pub fn resolve_config_with<F>(lookup: F) -> Result<OrionConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>
{
    let path = lookup(CONFIG_PATH_VAR)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let base = base_config(path.as_deref())?;
    let config = apply_env_overrides_with(base, lookup)?;
    config.validate()?;
    Ok(config)
}

fn base_config(path: Option<&Path>) -> Result<OrionConfig, ConfigFileError> {
    match path {
        Some(path) => {
            let config = load_from_file(path)?;
            tracing::info!(path = %path.display(), "Loaded configuration file");
            Ok(config)
        }
        None => Ok(OrionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_defaults_without_sources() {
        let config = resolve_config_with(|_| None).unwrap();
        assert_eq!(config, OrionConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orion.toml");
        fs::write(
            &path,
            "[server]\nport = 4000\nhost = \"127.0.0.1\"\n\n[qdrant]\ncollection = \"from_file\"\n"
        )
        .unwrap();

        let vars: HashMap<&str, String> = HashMap::from([
            (CONFIG_PATH_VAR, path.display().to_string()),
            ("ORION_PORT", "5000".to_string())
        ]);
        let config = resolve_config_with(|key| vars.get(key).cloned()).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.qdrant.collection, "from_file");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = resolve_config_with(|key| {
            (key == CONFIG_PATH_VAR).then(|| "/nonexistent/orion.toml".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::File(ConfigFileError::Unreadable { .. }))
        ));
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let result =
            resolve_config_with(|key| (key == "ORION_LOG_LEVEL").then(|| "loud".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
