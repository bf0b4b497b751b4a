//! # Configuration Structures
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization, every field defaulted
//! - Use `validator` for input validation

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level Orion configuration.
///
/// ## Fields
/// - `server`: HTTP bind address
/// - `auth`: dashboard credentials and session signing
/// - `notion`: durable record store
/// - `qdrant`: vector memory store
/// - `embedding`: embedding endpoint
/// - `llm`: generation endpoint
/// - `habitica`: Habitica API
/// - `observability`: logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct OrionConfig {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    #[validate(nested)]
    pub auth: AuthConfig,

    #[serde(default)]
    #[validate(nested)]
    pub notion: NotionConfig,

    #[serde(default)]
    #[validate(nested)]
    pub qdrant: QdrantConfig,

    #[serde(default)]
    #[validate(nested)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    #[validate(nested)]
    pub llm: LlmConfig,

    #[serde(default)]
    #[validate(nested)]
    pub habitica: HabiticaConfig,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

impl OrionConfig {
    /// Names the secrets the server cannot start without.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.auth.password.is_empty() {
            missing.push("auth.password");
        }
        if self.auth.jwt_secret.is_empty() {
            missing.push("auth.jwt_secret");
        }
        missing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    #[serde(default = "default_server_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: u16
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port()
        }
    }
}

/// Dashboard login and session signing.
///
/// `password` and `jwt_secret` have no defaults; see
/// [`OrionConfig::missing_secrets`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct AuthConfig {
    #[serde(default = "default_auth_username")]
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub jwt_secret: String,

    /// Session lifetime in seconds (1 minute to 30 days)
    #[serde(default = "default_session_ttl")]
    #[validate(range(min = 60, max = 2_592_000))]
    pub session_ttl_seconds: u64
}

fn default_auth_username() -> String {
    "admin".to_string()
}

fn default_session_ttl() -> u64 {
    86_400
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_auth_username(),
            password: String::new(),
            jwt_secret: String::new(),
            session_ttl_seconds: default_session_ttl()
        }
    }
}

/// Notion-backed record store.
///
/// The journal database and profile page identifiers are optional; routes
/// that need a missing one fail with a configuration error at call time.
/// Opportunity and milestone pages are addressed by their own page ids.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct NotionConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_notion_base_url")]
    #[validate(url)]
    pub base_url: String,

    #[serde(default = "default_notion_version")]
    #[validate(length(min = 1))]
    pub version: String,

    #[serde(default)]
    pub journal_database_id: Option<String>,

    #[serde(default)]
    pub profile_page_id: Option<String>,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64
}

fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_notion_base_url(),
            version: default_notion_version(),
            journal_database_id: None,
            profile_page_id: None,
            timeout_seconds: default_timeout()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct QdrantConfig {
    #[serde(default = "default_qdrant_url")]
    #[validate(url)]
    pub url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Collection journal entries and reflections are written to
    #[serde(default = "default_qdrant_collection")]
    #[validate(length(min = 1, max = 255))]
    pub collection: String,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_qdrant_collection() -> String {
    "orion_memory".to_string()
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            api_key: None,
            collection: default_qdrant_collection(),
            timeout_seconds: default_timeout()
        }
    }
}

/// OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct EmbeddingConfig {
    #[serde(default = "default_openai_base_url")]
    #[validate(url)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    #[validate(length(min = 1))]
    pub model: String,

    /// In-process LRU cache capacity (entries)
    #[serde(default = "default_embedding_cache_size")]
    #[validate(range(min = 1, max = 100_000))]
    pub cache_size: usize,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_cache_size() -> usize {
    1000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            model: default_embedding_model(),
            cache_size: default_embedding_cache_size(),
            timeout_seconds: default_timeout()
        }
    }
}

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct LlmConfig {
    #[serde(default = "default_openai_base_url")]
    #[validate(url)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    #[validate(length(min = 1))]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub timeout_seconds: u64
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct HabiticaConfig {
    #[serde(default = "default_habitica_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Sent as `x-client`, as Habitica asks of third-party tools
    #[serde(default = "default_habitica_client_id")]
    #[validate(length(min = 1, max = 255))]
    pub client_id: String,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64
}

fn default_habitica_base_url() -> String {
    "https://habitica.com/api/v3".to_string()
}

fn default_habitica_client_id() -> String {
    "orion-dashboard".to_string()
}

impl Default for HabiticaConfig {
    fn default() -> Self {
        Self {
            base_url: default_habitica_base_url(),
            client_id: default_habitica_client_id(),
            timeout_seconds: default_timeout()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub log_level: String,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: default_metrics_enabled()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OrionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.qdrant.collection, "orion_memory");
        assert_eq!(config.notion.version, "2022-06-28");
    }

    #[test]
    fn test_default_config_reports_missing_secrets() {
        let config = OrionConfig::default();
        assert_eq!(
            config.missing_secrets(),
            vec!["auth.password", "auth.jwt_secret"]
        );
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = OrionConfig::default();
        config.observability.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = OrionConfig::default();
        config.llm.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_ttl_range() {
        let mut config = OrionConfig::default();
        config.auth.session_ttl_seconds = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: OrionConfig = serde_json::from_value(serde_json::json!({
            "qdrant": { "collection": "journal" }
        }))
        .unwrap();
        assert_eq!(config.qdrant.collection, "journal");
        assert_eq!(config.qdrant.url, "http://localhost:6333");
        assert_eq!(config.embedding.cache_size, 1000);
    }
}
