//! Collaborator traits.
//!
//! Every upstream service Orion talks to is reached through one of these
//! traits so the workflows can be driven by in-process mocks in tests.

use async_trait::async_trait;
use errors::{ProviderError, Service};

use crate::types::{
    GenerationRequest, HabiticaCredentials, HabiticaTask, JournalEntryRecord, MemoryPoint,
    MemoryQuery, NewJournalPage, NewTodo, Opportunity, OpportunityEvaluation, ScoreDirection,
    ScoreResult, ScoredMemoryPoint, TaskType, UserProfile
};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Durable record storage (journal pages, opportunities, profile,
/// career milestones).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates a journal page and returns its stable page identifier.
    async fn create_journal_entry(&self, page: &NewJournalPage) -> ProviderResult<String>;

    /// Lists every journal page, newest first.
    async fn list_journal_entries(&self) -> ProviderResult<Vec<JournalEntryRecord>>;

    async fn fetch_opportunity(&self, id: &str) -> ProviderResult<Opportunity>;

    async fn save_opportunity_evaluation(
        &self,
        id: &str,
        evaluation: &OpportunityEvaluation
    ) -> ProviderResult<()>;

    async fn fetch_profile(&self) -> ProviderResult<UserProfile>;

    async fn update_milestone_order(&self, id: &str, order: i64) -> ProviderResult<()>;
}

/// Turns text into fixed-length vectors.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| ProviderError::empty(Service::Embedding, "embedding"))
    }
}

/// Named-collection vector storage with filtered similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, collection: &str, points: &[MemoryPoint]) -> ProviderResult<()>;

    async fn search(
        &self,
        collection: &str,
        query: &MemoryQuery
    ) -> ProviderResult<Vec<ScoredMemoryPoint>>;
}

/// Text generation.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String>;
}

/// Habitica task API, authenticated with caller-supplied credentials.
#[async_trait]
pub trait HabiticaClient: Send + Sync {
    async fn list_tasks(
        &self,
        credentials: &HabiticaCredentials,
        task_type: TaskType
    ) -> ProviderResult<Vec<HabiticaTask>>;

    async fn score_task(
        &self,
        credentials: &HabiticaCredentials,
        task_id: &str,
        direction: ScoreDirection
    ) -> ProviderResult<ScoreResult>;

    async fn create_todo(
        &self,
        credentials: &HabiticaCredentials,
        todo: &NewTodo
    ) -> ProviderResult<HabiticaTask>;
}
