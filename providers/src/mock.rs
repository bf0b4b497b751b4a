//! In-process collaborators with call recorders and failure switches.
//!
//! Every recorded call is kept, including calls that were configured to fail,
//! so tests can assert on attempts as well as outcomes.

use async_trait::async_trait;
use errors::{ProviderError, Service};
use orion_core::traits::{
    EmbeddingService, GenerationService, HabiticaClient, ProviderResult, RecordStore, VectorStore
};
use orion_core::types::{
    GenerationRequest, HabiticaCredentials, HabiticaTask, JournalEntryRecord, MemoryPoint,
    MemoryQuery, MemoryType, NewJournalPage, NewTodo, Opportunity, OpportunityEvaluation,
    ScoreDirection, ScoreResult, ScoredMemoryPoint, TaskType, UserProfile
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

fn mock_failure(service: Service) -> ProviderError {
    ProviderError::Status {
        service,
        status: 500,
        message: "mock failure".to_string()
    }
}

// ============================================================================
// Record store
// ============================================================================

#[derive(Default)]
struct RecordState {
    created: Vec<NewJournalPage>,
    journal: Vec<JournalEntryRecord>,
    opportunities: HashMap<String, Opportunity>,
    profile: Option<UserProfile>,
    evaluations: Vec<(String, OpportunityEvaluation)>,
    milestone_updates: Vec<(String, i64)>,
    failing_milestones: HashSet<String>,
    fail_create: bool,
    fail_profile: bool,
    fail_evaluation_save: bool
}

#[derive(Default)]
pub struct MockRecordStore {
    state: Mutex<RecordState>,
    next_id: AtomicUsize
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_create(mut self) -> Self {
        self.state.get_mut().fail_create = true;
        self
    }

    pub fn with_journal_entries(mut self, entries: Vec<JournalEntryRecord>) -> Self {
        self.state.get_mut().journal = entries;
        self
    }

    pub fn with_opportunity(mut self, opportunity: Opportunity) -> Self {
        self.state
            .get_mut()
            .opportunities
            .insert(opportunity.id.clone(), opportunity);
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.state.get_mut().profile = Some(profile);
        self
    }

    pub fn with_failing_profile(mut self) -> Self {
        self.state.get_mut().fail_profile = true;
        self
    }

    pub fn with_failing_evaluation_save(mut self) -> Self {
        self.state.get_mut().fail_evaluation_save = true;
        self
    }

    pub fn with_failing_milestone(mut self, id: impl Into<String>) -> Self {
        self.state.get_mut().failing_milestones.insert(id.into());
        self
    }

    pub async fn created_pages(&self) -> Vec<NewJournalPage> {
        self.state.lock().await.created.clone()
    }

    pub async fn saved_evaluations(&self) -> Vec<(String, OpportunityEvaluation)> {
        self.state.lock().await.evaluations.clone()
    }

    pub async fn milestone_updates(&self) -> Vec<(String, i64)> {
        self.state.lock().await.milestone_updates.clone()
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn create_journal_entry(&self, page: &NewJournalPage) -> ProviderResult<String> {
        let mut state = self.state.lock().await;
        state.created.push(page.clone());
        if state.fail_create {
            return Err(mock_failure(Service::Notion));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("notion-page-{n}"))
    }

    async fn list_journal_entries(&self) -> ProviderResult<Vec<JournalEntryRecord>> {
        Ok(self.state.lock().await.journal.clone())
    }

    async fn fetch_opportunity(&self, id: &str) -> ProviderResult<Opportunity> {
        self.state
            .lock()
            .await
            .opportunities
            .get(id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                service: Service::Notion,
                id: id.to_string()
            })
    }

    async fn save_opportunity_evaluation(
        &self,
        id: &str,
        evaluation: &OpportunityEvaluation
    ) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        state.evaluations.push((id.to_string(), evaluation.clone()));
        if state.fail_evaluation_save {
            return Err(mock_failure(Service::Notion));
        }
        Ok(())
    }

    async fn fetch_profile(&self) -> ProviderResult<UserProfile> {
        let state = self.state.lock().await;
        if state.fail_profile {
            return Err(mock_failure(Service::Notion));
        }
        state
            .profile
            .clone()
            .ok_or_else(|| ProviderError::not_configured(Service::Notion, "notion.profile_page_id"))
    }

    async fn update_milestone_order(&self, id: &str, order: i64) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        state.milestone_updates.push((id.to_string(), order));
        if state.failing_milestones.contains(id) {
            return Err(mock_failure(Service::Notion));
        }
        Ok(())
    }
}

// ============================================================================
// Embeddings
// ============================================================================

pub struct MockEmbeddingService {
    dimension: usize,
    fail: bool,
    fail_containing: Option<String>,
    empty: bool,
    calls: Mutex<Vec<String>>
}

impl MockEmbeddingService {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
            fail_containing: None,
            empty: false,
            calls: Mutex::new(Vec::new())
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(8)
        }
    }

    /// Fails only for texts containing `needle`.
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            fail_containing: Some(needle.into()),
            ..Self::new(8)
        }
    }

    /// Succeeds with zero-length vectors.
    pub fn returning_empty() -> Self {
        Self {
            empty: true,
            ..Self::new(8)
        }
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        if self.empty {
            return Vec::new();
        }
        let seed = text.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
        (0..self.dimension)
            .map(|i| ((seed.wrapping_add(i as u32) % 97) as f32 + 1.0) / 100.0)
            .collect()
    }
}

impl Default for MockEmbeddingService {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        self.calls.lock().await.extend(texts.iter().cloned());

        let should_fail = self.fail
            || self
                .fail_containing
                .as_deref()
                .is_some_and(|needle| texts.iter().any(|text| text.contains(needle)));
        if should_fail {
            return Err(mock_failure(Service::Embedding));
        }

        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }
}

// ============================================================================
// Vector store
// ============================================================================

#[derive(Default)]
pub struct MockVectorStore {
    upserts: Mutex<Vec<(String, Vec<MemoryPoint>)>>,
    searches: Mutex<Vec<(String, MemoryQuery)>>,
    results: Vec<ScoredMemoryPoint>,
    fail_upsert: bool,
    fail_upsert_of: Option<MemoryType>,
    fail_search: bool
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, results: Vec<ScoredMemoryPoint>) -> Self {
        self.results = results;
        self
    }

    pub fn with_failing_upsert(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    /// Fails upserts carrying a point of `memory_type`.
    pub fn with_failing_upsert_of(mut self, memory_type: MemoryType) -> Self {
        self.fail_upsert_of = Some(memory_type);
        self
    }

    pub fn with_failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub async fn upsert_calls(&self) -> Vec<(String, Vec<MemoryPoint>)> {
        self.upserts.lock().await.clone()
    }

    pub async fn search_calls(&self) -> Vec<(String, MemoryQuery)> {
        self.searches.lock().await.clone()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn upsert(&self, collection: &str, points: &[MemoryPoint]) -> ProviderResult<()> {
        self.upserts
            .lock()
            .await
            .push((collection.to_string(), points.to_vec()));

        let typed_failure = self
            .fail_upsert_of
            .as_ref()
            .is_some_and(|kind| points.iter().any(|p| &p.payload.memory_type == kind));
        if self.fail_upsert || typed_failure {
            return Err(mock_failure(Service::Qdrant));
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &MemoryQuery
    ) -> ProviderResult<Vec<ScoredMemoryPoint>> {
        self.searches
            .lock()
            .await
            .push((collection.to_string(), query.clone()));
        if self.fail_search {
            return Err(mock_failure(Service::Qdrant));
        }
        Ok(self.results.iter().take(query.limit).cloned().collect())
    }
}

// ============================================================================
// Generation
// ============================================================================

pub struct MockGenerationService {
    response: String,
    fail: bool,
    requests: Mutex<Vec<GenerationRequest>>
}

impl MockGenerationService {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            fail: false,
            requests: Mutex::new(Vec::new())
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(String::new())
        }
    }

    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        self.requests.lock().await.push(request.clone());
        if self.fail {
            return Err(mock_failure(Service::Llm));
        }
        Ok(self.response.clone())
    }
}

// ============================================================================
// Habitica
// ============================================================================

#[derive(Default)]
pub struct MockHabiticaClient {
    tasks: Vec<HabiticaTask>,
    fail: bool,
    calls: Mutex<Vec<String>>
}

impl MockHabiticaClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(mut self, tasks: Vec<HabiticaTask>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// One line per call, e.g. `list:todos`, `score:t1:up`, `create:Send CV`.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: String) -> ProviderResult<()> {
        self.calls.lock().await.push(call);
        if self.fail {
            return Err(mock_failure(Service::Habitica));
        }
        Ok(())
    }
}

#[async_trait]
impl HabiticaClient for MockHabiticaClient {
    async fn list_tasks(
        &self,
        _credentials: &HabiticaCredentials,
        task_type: TaskType
    ) -> ProviderResult<Vec<HabiticaTask>> {
        self.record(format!("list:{task_type}")).await?;
        Ok(self.tasks.clone())
    }

    async fn score_task(
        &self,
        _credentials: &HabiticaCredentials,
        task_id: &str,
        direction: ScoreDirection
    ) -> ProviderResult<ScoreResult> {
        self.record(format!("score:{task_id}:{direction}")).await?;
        let delta = match direction {
            ScoreDirection::Up => 1.0,
            ScoreDirection::Down => -1.0
        };
        Ok(ScoreResult {
            delta,
            hp: None,
            exp: None,
            gp: None,
            lvl: None
        })
    }

    async fn create_todo(
        &self,
        _credentials: &HabiticaCredentials,
        todo: &NewTodo
    ) -> ProviderResult<HabiticaTask> {
        self.record(format!("create:{}", todo.text)).await?;
        Ok(HabiticaTask {
            id: format!("task-{}", self.tasks.len() + 1),
            text: todo.text.clone(),
            task_type: "todo".to_string(),
            notes: todo.notes.clone().unwrap_or_default(),
            completed: Some(false),
            priority: todo.priority,
            value: None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orion_core::types::MemoryPayload;

    #[tokio::test]
    async fn test_mock_record_store_issues_distinct_ids() {
        let store = MockRecordStore::new();
        let page = NewJournalPage {
            title: "t".to_string(),
            date: "2024-05-01".to_string(),
            content: "t".to_string(),
            mood: None,
            tags: Vec::new()
        };
        let a = store.create_journal_entry(&page).await.unwrap();
        let b = store.create_journal_entry(&page).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.created_pages().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_record_store_records_failed_create() {
        let store = MockRecordStore::new().with_failing_create();
        let page = NewJournalPage {
            title: "t".to_string(),
            date: "2024-05-01".to_string(),
            content: "t".to_string(),
            mood: None,
            tags: Vec::new()
        };
        assert!(store.create_journal_entry(&page).await.is_err());
        assert_eq!(store.created_pages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_embedding_is_deterministic() {
        let service = MockEmbeddingService::new(16);
        let a = service.embed("Rust").await.unwrap();
        let b = service.embed("Rust").await.unwrap();
        let c = service.embed("Python").await.unwrap();
        assert_eq!(a.len(), 16);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(service.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_embedding_failing_on_needle() {
        let service = MockEmbeddingService::failing_on("reflection");
        assert!(service.embed("journal text").await.is_ok());
        assert!(service.embed("a reflection").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_embedding_empty_vectors() {
        let service = MockEmbeddingService::returning_empty();
        let err = service.embed("anything").await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult { .. }));
    }

    #[tokio::test]
    async fn test_mock_vector_store_typed_failure() {
        let store = MockVectorStore::new().with_failing_upsert_of(MemoryType::JournalReflection);
        let payload = MemoryPayload {
            text: "x".to_string(),
            source_id: "s".to_string(),
            timestamp: String::new(),
            indexed_at: String::new(),
            memory_type: MemoryType::JournalEntry,
            tags: Vec::new(),
            mood: None,
            original_entry_id: None
        };
        let entry = MemoryPoint::new(vec![0.1], payload.clone());
        let reflection = MemoryPoint::new(
            vec![0.1],
            MemoryPayload {
                memory_type: MemoryType::JournalReflection,
                ..payload
            }
        );

        assert!(store.upsert("c", &[entry]).await.is_ok());
        assert!(store.upsert("c", &[reflection]).await.is_err());
        assert_eq!(store.upsert_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_habitica_records_calls() {
        let client = MockHabiticaClient::new();
        let credentials = HabiticaCredentials {
            user_id: "u".to_string(),
            api_token: "t".to_string()
        };
        client.list_tasks(&credentials, TaskType::Todos).await.unwrap();
        client
            .score_task(&credentials, "t1", ScoreDirection::Down)
            .await
            .unwrap();
        assert_eq!(client.calls().await, vec!["list:todos", "score:t1:down"]);
    }
}
