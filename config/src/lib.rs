//! # Configuration System
//!
//! Centralized configuration management for Orion.
//!
//! This crate provides:
//! - Configuration structures for every collaborator and the server
//! - Configuration file loading (TOML/YAML)
//! - Environment variable overrides (12-factor app principles)
//! - Configuration precedence (env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod precedence;

pub use config::{
    AuthConfig, EmbeddingConfig, HabiticaConfig, LlmConfig, NotionConfig, ObservabilityConfig,
    OrionConfig, QdrantConfig, ServerConfig
};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::{EnvError, apply_env_overrides, apply_env_overrides_with};
pub use precedence::{CONFIG_PATH_VAR, ConfigError, load_config, resolve_config_with};
pub use validator::Validate;
