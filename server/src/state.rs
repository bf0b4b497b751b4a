//! Application state for the Orion server.

use config::OrionConfig;
use errors::ProviderError;
use metrics_exporter_prometheus::PrometheusHandle;
use orion_core::traits::{
    EmbeddingService, GenerationService, HabiticaClient, RecordStore, VectorStore
};
use providers::{
    HabiticaApiClient, NotionRecordStore, OpenAiEmbeddingService, OpenAiGenerationService,
    QdrantVectorStore
};
use std::sync::Arc;
use workflows::{JournalOrchestrator, OpportunityEvaluator};

/// The upstream collaborators every route works through.
#[derive(Clone)]
pub struct Collaborators {
    pub records: Arc<dyn RecordStore>,
    pub embeddings: Arc<dyn EmbeddingService>,
    pub vectors: Arc<dyn VectorStore>,
    pub generation: Arc<dyn GenerationService>,
    pub habitica: Arc<dyn HabiticaClient>
}

impl Collaborators {
    /// Builds the HTTP providers described by `config`.
    pub fn from_config(config: &OrionConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            records: Arc::new(NotionRecordStore::new(config.notion.clone())?),
            embeddings: Arc::new(OpenAiEmbeddingService::new(config.embedding.clone())?),
            vectors: Arc::new(QdrantVectorStore::new(config.qdrant.clone())?),
            generation: Arc::new(OpenAiGenerationService::new(config.llm.clone())?),
            habitica: Arc::new(HabiticaApiClient::new(config.habitica.clone())?)
        })
    }
}

/// Shared application state for Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OrionConfig>,
    pub collaborators: Collaborators,
    /// Present when the Prometheus recorder was installed.
    pub metrics: Option<PrometheusHandle>
}

impl AppState {
    /// Creates application state backed by the production providers.
    pub fn from_config(config: OrionConfig) -> Result<Self, ProviderError> {
        let collaborators = Collaborators::from_config(&config)?;
        Ok(Self::with_collaborators(config, collaborators))
    }

    /// Creates application state from existing collaborators (useful for testing).
    #[must_use]
    pub fn with_collaborators(config: OrionConfig, collaborators: Collaborators) -> Self {
        Self {
            config: Arc::new(config),
            collaborators,
            metrics: None
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Default memory collection.
    pub fn collection(&self) -> &str {
        &self.config.qdrant.collection
    }

    pub fn journal(&self) -> JournalOrchestrator {
        let c = &self.collaborators;
        JournalOrchestrator::new(
            c.records.clone(),
            c.embeddings.clone(),
            c.vectors.clone(),
            c.generation.clone(),
            self.collection()
        )
    }

    pub fn evaluator(&self) -> OpportunityEvaluator {
        let c = &self.collaborators;
        OpportunityEvaluator::new(
            c.records.clone(),
            c.embeddings.clone(),
            c.vectors.clone(),
            c.generation.clone(),
            self.collection()
        )
    }
}
