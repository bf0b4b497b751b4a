//! # Environment Variable Loader
//!
//! Applies environment variable overrides on top of a base configuration.
//!
//! # Naming Convention
//! - `ORION_*`: server, auth and observability settings
//! - `NOTION_*`: record store settings
//! - `QDRANT_*`: vector store settings
//! - `EMBEDDING_*`: embedding endpoint settings
//! - `LLM_*`: generation endpoint settings
//! - `HABITICA_*`: Habitica settings

use crate::config::OrionConfig;
use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String }
}

/// Applies overrides read from the process environment.
pub fn apply_env_overrides(config: OrionConfig) -> Result<OrionConfig, EnvError> {
    apply_env_overrides_with(config, |key| env::var(key).ok())
}

/// Applies overrides read through `lookup`.
///
/// Unset variables leave the base value untouched. Empty values clear
/// optional settings.
pub fn apply_env_overrides_with<F>(
    mut config: OrionConfig,
    lookup: F
) -> Result<OrionConfig, EnvError>
where
    F: Fn(&str) -> Option<String>
{
    let env = EnvSource { lookup };

    env.string("ORION_HOST", &mut config.server.host);
    env.parsed("ORION_PORT", &mut config.server.port)?;

    env.string("ORION_AUTH_USERNAME", &mut config.auth.username);
    env.string("ORION_AUTH_PASSWORD", &mut config.auth.password);
    env.string("ORION_JWT_SECRET", &mut config.auth.jwt_secret);
    env.parsed(
        "ORION_SESSION_TTL_SECONDS",
        &mut config.auth.session_ttl_seconds
    )?;

    env.optional("NOTION_API_KEY", &mut config.notion.api_key);
    env.string("NOTION_BASE_URL", &mut config.notion.base_url);
    env.string("NOTION_VERSION", &mut config.notion.version);
    env.optional(
        "NOTION_JOURNAL_DATABASE_ID",
        &mut config.notion.journal_database_id
    );
    env.optional("NOTION_PROFILE_PAGE_ID", &mut config.notion.profile_page_id);

    env.string("QDRANT_URL", &mut config.qdrant.url);
    env.optional("QDRANT_API_KEY", &mut config.qdrant.api_key);
    env.string("QDRANT_COLLECTION", &mut config.qdrant.collection);

    env.string("EMBEDDING_BASE_URL", &mut config.embedding.base_url);
    env.optional("EMBEDDING_API_KEY", &mut config.embedding.api_key);
    env.string("EMBEDDING_MODEL", &mut config.embedding.model);
    env.parsed("EMBEDDING_CACHE_SIZE", &mut config.embedding.cache_size)?;

    env.string("LLM_BASE_URL", &mut config.llm.base_url);
    env.optional("LLM_API_KEY", &mut config.llm.api_key);
    env.string("LLM_MODEL", &mut config.llm.model);

    env.string("HABITICA_BASE_URL", &mut config.habitica.base_url);
    env.string("HABITICA_CLIENT_ID", &mut config.habitica.client_id);

    env.string("ORION_LOG_LEVEL", &mut config.observability.log_level);
    env.boolean(
        "ORION_METRICS_ENABLED",
        &mut config.observability.metrics_enabled
    )?;

    Ok(config)
}

struct EnvSource<F> {
    lookup: F
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>
{
    fn string(&self, key: &str, target: &mut String) {
        if let Some(value) = (self.lookup)(key) {
            *target = value;
        }
    }

    fn optional(&self, key: &str, target: &mut Option<String>) {
        if let Some(value) = (self.lookup)(key) {
            *target = if value.trim().is_empty() {
                None
            } else {
                Some(value)
            };
        }
    }

    fn parsed<T: FromStr>(&self, key: &str, target: &mut T) -> Result<(), EnvError> {
        if let Some(value) = (self.lookup)(key) {
            *target = value
                .trim()
                .parse()
                .map_err(|_| EnvError::InvalidValue {
                    key: key.to_string(),
                    value
                })?;
        }
        Ok(())
    }

    fn boolean(&self, key: &str, target: &mut bool) -> Result<(), EnvError> {
        if let Some(value) = (self.lookup)(key) {
            *target = match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(EnvError::InvalidValue {
                        key: key.to_string(),
                        value
                    });
                }
            };
        }
        Ok(())
    }
}
