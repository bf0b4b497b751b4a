//! Journal save orchestration.
//!
//! One submission is written to up to two destinations: the durable record
//! store and the vector memory store. The durable write is the only one whose
//! failure always aborts the request. A vector-store failure aborts only when
//! there is no durable copy to fall back on. A reflection is then generated
//! and, when the entry has a durable id and its memory point was stored,
//! written to memory as a second point. Reflection failures never fail the
//! request.

use crate::error::{JournalError, ReflectionError};
use crate::telemetry::{GenerationTimer, Telemetry};
use orion_core::traits::{EmbeddingService, GenerationService, RecordStore, VectorStore};
use orion_core::types::{
    GenerationRequest, JournalEntry, MemoryPayload, MemoryPoint, MemoryType, NewJournalPage,
    RequestType, now_timestamp
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Journal titles are cut to this many characters.
pub const TITLE_MAX_CHARS: usize = 100;

const REFLECTION_TEMPERATURE: f32 = 0.7;
const REFLECTION_MAX_TOKENS: u32 = 500;

const JOURNAL_TAG: &str = "journal";
const REFLECTION_TAG: &str = "reflection";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveJournalRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub entry_timestamp: Option<String>,
    #[serde(default = "default_true")]
    pub save_to_notion: bool,
    #[serde(default = "default_true")]
    pub save_to_qdrant: bool
}

fn default_true() -> bool {
    true
}

/// `{success, sourceId, reflection?, error?}` as returned by the save route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveJournalResponse {
    pub success: bool,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
}

impl SaveJournalResponse {
    pub fn saved(source_id: Option<String>, reflection: Option<String>) -> Self {
        Self {
            success: true,
            source_id,
            reflection,
            error: None
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            source_id: None,
            reflection: None,
            error: Some(error.into())
        }
    }
}

/// A reflection that was generated and stored in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Reflection {
    pub text: String,
    pub source_id: String,
    pub original_entry_id: String,
    pub point_id: Uuid
}

pub struct JournalOrchestrator {
    records: Arc<dyn RecordStore>,
    embeddings: Arc<dyn EmbeddingService>,
    vectors: Arc<dyn VectorStore>,
    generation: Arc<dyn GenerationService>,
    collection: String
}

impl JournalOrchestrator {
    pub fn new(
        records: Arc<dyn RecordStore>,
        embeddings: Arc<dyn EmbeddingService>,
        vectors: Arc<dyn VectorStore>,
        generation: Arc<dyn GenerationService>,
        collection: impl Into<String>
    ) -> Self {
        Self {
            records,
            embeddings,
            vectors,
            generation,
            collection: collection.into()
        }
    }

    pub async fn save(
        &self,
        request: SaveJournalRequest
    ) -> Result<SaveJournalResponse, JournalError> {
        let text = request.text.trim();
        if text.is_empty() {
            Telemetry::record_journal_save("invalid");
            return Err(JournalError::InvalidInput);
        }

        let mut entry = JournalEntry {
            text: text.to_string(),
            mood: request
                .mood
                .map(|mood| mood.trim().to_string())
                .filter(|mood| !mood.is_empty()),
            tags: request.tags,
            entry_timestamp: request
                .entry_timestamp
                .filter(|ts| !ts.trim().is_empty())
                .unwrap_or_else(now_timestamp),
            source_id: None
        };

        if !request.save_to_notion && !request.save_to_qdrant {
            Telemetry::record_journal_save("skipped");
            return Ok(SaveJournalResponse::saved(None, None));
        }

        if request.save_to_notion {
            match self.records.create_journal_entry(&journal_page(&entry)).await {
                Ok(page_id) => {
                    tracing::info!(source_id = %page_id, "Journal entry saved to record store");
                    entry.source_id = Some(page_id);
                }
                Err(source) => {
                    tracing::error!(error = %source, "Journal record store write failed");
                    Telemetry::record_journal_save("failed");
                    return Err(JournalError::DurableStoreWriteFailed { source });
                }
            }
        }

        let durable = entry.source_id.is_some();
        let memory_source_id = entry
            .source_id
            .clone()
            .unwrap_or_else(|| fallback_source_id(&entry.entry_timestamp));

        let mut stored_in_memory = false;
        let mut degraded = false;
        if request.save_to_qdrant {
            match self.store_entry(&entry, &memory_source_id).await {
                Ok(()) => stored_in_memory = true,
                Err(e) if durable => {
                    tracing::warn!(
                        error = %e,
                        cause = ?std::error::Error::source(&e).map(ToString::to_string),
                        source_id = %memory_source_id,
                        "Journal memory write failed; entry kept in record store only"
                    );
                    degraded = true;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        cause = ?std::error::Error::source(&e).map(ToString::to_string),
                        "Journal memory write failed with no durable copy"
                    );
                    Telemetry::record_journal_save("failed");
                    return Err(e);
                }
            }
        }

        let reflection = match self.reflect(&entry, stored_in_memory).await {
            Ok(reflection) => {
                Telemetry::record_reflection("stored");
                Some(reflection.text)
            }
            Err(e) => {
                Telemetry::record_reflection(match e {
                    ReflectionError::Generation(_) => "generation_failed",
                    ReflectionError::NotEligible => "not_stored",
                    ReflectionError::Embedding(_) | ReflectionError::Store(_) => "storage_failed"
                });
                tracing::warn!(error = %e, "Journal reflection not stored");
                None
            }
        };

        let source_id = entry
            .source_id
            .or_else(|| stored_in_memory.then_some(memory_source_id));

        Telemetry::record_journal_save(if degraded { "degraded" } else { "saved" });
        Ok(SaveJournalResponse::saved(source_id, reflection))
    }

    async fn store_entry(&self, entry: &JournalEntry, source_id: &str) -> Result<(), JournalError> {
        let vector = self
            .embeddings
            .embed(&entry.text)
            .await
            .map_err(|source| JournalError::EmbeddingFailed { source })?;

        let point = MemoryPoint::new(
            vector,
            MemoryPayload {
                text: entry.text.clone(),
                source_id: source_id.to_string(),
                timestamp: entry.entry_timestamp.clone(),
                indexed_at: now_timestamp(),
                memory_type: MemoryType::JournalEntry,
                tags: memory_tags(&[JOURNAL_TAG], &entry.tags),
                mood: entry.mood.clone(),
                original_entry_id: entry.source_id.clone()
            }
        );

        self.vectors
            .upsert(&self.collection, &[point])
            .await
            .map_err(|source| JournalError::VectorStoreWriteFailed { source })
    }

    /// Generates a reflection on `entry` and stores it in memory.
    ///
    /// Generation is always attempted. Storage additionally requires a
    /// durable `source_id` and `entry_in_memory`.
    pub async fn reflect(
        &self,
        entry: &JournalEntry,
        entry_in_memory: bool
    ) -> Result<Reflection, ReflectionError> {
        let timer = GenerationTimer::new(RequestType::JournalReflection);
        let generated = self
            .generation
            .generate(&GenerationRequest {
                request_type: RequestType::JournalReflection,
                primary_context: entry.text.clone(),
                temperature: REFLECTION_TEMPERATURE,
                max_tokens: REFLECTION_MAX_TOKENS
            })
            .await;
        timer.finish();
        let text = generated.map_err(ReflectionError::Generation)?;

        let original_entry_id = match (&entry.source_id, entry_in_memory) {
            (Some(id), true) => id.clone(),
            _ => return Err(ReflectionError::NotEligible)
        };
        let source_id = format!("reflection_{original_entry_id}");

        let vector = self
            .embeddings
            .embed(&text)
            .await
            .map_err(ReflectionError::Embedding)?;

        let now = now_timestamp();
        let point = MemoryPoint::new(
            vector,
            MemoryPayload {
                text: text.clone(),
                source_id: source_id.clone(),
                timestamp: now.clone(),
                indexed_at: now,
                memory_type: MemoryType::JournalReflection,
                tags: memory_tags(&[JOURNAL_TAG, REFLECTION_TAG], &entry.tags),
                mood: entry.mood.clone(),
                original_entry_id: Some(original_entry_id.clone())
            }
        );
        let point_id = point.id;

        self.vectors
            .upsert(&self.collection, &[point])
            .await
            .map_err(ReflectionError::Store)?;

        tracing::info!(source_id = %source_id, "Journal reflection stored");
        Ok(Reflection {
            text,
            source_id,
            original_entry_id,
            point_id
        })
    }
}

fn journal_page(entry: &JournalEntry) -> NewJournalPage {
    NewJournalPage {
        title: entry_title(&entry.text),
        date: entry.entry_timestamp.clone(),
        content: entry.text.clone(),
        mood: entry.mood.clone(),
        tags: entry
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// First [`TITLE_MAX_CHARS`] characters of `text`, with `...` appended when cut.
pub fn entry_title(text: &str) -> String {
    let mut chars = text.chars();
    let title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{title}...")
    } else {
        title
    }
}

/// `journal_<timestamp with non-alphanumerics replaced by '-'>_<8 hex>`.
pub fn fallback_source_id(timestamp: &str) -> String {
    let sanitized: String = timestamp
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let random = Uuid::new_v4().simple().to_string();
    format!("journal_{sanitized}_{}", &random[..8])
}

/// `base` followed by the user tags trimmed and lowercased, without empties or
/// repeats.
pub fn memory_tags(base: &[&str], user_tags: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = base.iter().map(|tag| (*tag).to_string()).collect();
    for tag in user_tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::mock::{
        MockEmbeddingService, MockGenerationService, MockRecordStore, MockVectorStore
    };

    const COLLECTION: &str = "orion_memory";

    struct Harness {
        records: Arc<MockRecordStore>,
        embeddings: Arc<MockEmbeddingService>,
        vectors: Arc<MockVectorStore>,
        generation: Arc<MockGenerationService>
    }

    impl Harness {
        fn new(
            records: MockRecordStore,
            embeddings: MockEmbeddingService,
            vectors: MockVectorStore,
            generation: MockGenerationService
        ) -> Self {
            Self {
                records: Arc::new(records),
                embeddings: Arc::new(embeddings),
                vectors: Arc::new(vectors),
                generation: Arc::new(generation)
            }
        }

        fn healthy() -> Self {
            Self::new(
                MockRecordStore::new(),
                MockEmbeddingService::default(),
                MockVectorStore::new(),
                MockGenerationService::new("You sound energised by your work.")
            )
        }

        fn orchestrator(&self) -> JournalOrchestrator {
            JournalOrchestrator::new(
                self.records.clone(),
                self.embeddings.clone(),
                self.vectors.clone(),
                self.generation.clone(),
                COLLECTION
            )
        }
    }

    fn request(text: &str, save_to_notion: bool, save_to_qdrant: bool) -> SaveJournalRequest {
        SaveJournalRequest {
            text: text.to_string(),
            mood: None,
            tags: Vec::new(),
            entry_timestamp: None,
            save_to_notion,
            save_to_qdrant
        }
    }

    #[tokio::test]
    async fn test_notion_only_returns_page_id() {
        let harness = Harness::healthy();
        let response = harness
            .orchestrator()
            .save(request("A quiet morning", true, false))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.source_id.as_deref(), Some("notion-page-1"));
        assert!(response.reflection.is_none());
        assert!(harness.embeddings.calls().await.is_empty());
        assert!(harness.vectors.upsert_calls().await.is_empty());
        assert_eq!(harness.generation.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_rejected_for_every_toggle() {
        for (notion, qdrant) in [(true, true), (true, false), (false, true), (false, false)] {
            for text in ["", "   ", "\n\t"] {
                let harness = Harness::healthy();
                let err = harness
                    .orchestrator()
                    .save(request(text, notion, qdrant))
                    .await
                    .unwrap_err();

                assert!(matches!(err, JournalError::InvalidInput));
                assert!(err.to_string().contains("empty"));
                assert!(harness.records.created_pages().await.is_empty());
                assert!(harness.generation.requests().await.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_no_destination_writes_nothing() {
        let harness = Harness::healthy();
        let response = harness
            .orchestrator()
            .save(request("Nothing to keep", false, false))
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.source_id.is_none());
        assert!(response.reflection.is_none());
        assert!(harness.records.created_pages().await.is_empty());
        assert!(harness.embeddings.calls().await.is_empty());
        assert!(harness.vectors.upsert_calls().await.is_empty());
        assert!(harness.generation.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_reflection_stored_only_when_all_three_succeed() {
        for durable_ok in [true, false] {
            for vector_ok in [true, false] {
                for generation_ok in [true, false] {
                    let harness = Harness::new(
                        if durable_ok {
                            MockRecordStore::new()
                        } else {
                            MockRecordStore::new().with_failing_create()
                        },
                        MockEmbeddingService::default(),
                        if vector_ok {
                            MockVectorStore::new()
                        } else {
                            MockVectorStore::new().with_failing_upsert()
                        },
                        if generation_ok {
                            MockGenerationService::new("reflection text")
                        } else {
                            MockGenerationService::failing()
                        }
                    );

                    let result = harness
                        .orchestrator()
                        .save(request("Matrix entry", true, true))
                        .await;
                    let upserts = harness.vectors.upsert_calls().await;
                    let case = format!(
                        "durable={durable_ok} vector={vector_ok} generation={generation_ok}"
                    );

                    if !durable_ok {
                        assert!(
                            matches!(result, Err(JournalError::DurableStoreWriteFailed { .. })),
                            "{case}"
                        );
                        assert!(upserts.is_empty(), "{case}");
                        continue;
                    }

                    let response = result.unwrap();
                    let expect_reflection = vector_ok && generation_ok;
                    assert!(response.success, "{case}");
                    assert_eq!(response.reflection.is_some(), expect_reflection, "{case}");
                    assert_eq!(upserts.len(), 1 + usize::from(expect_reflection), "{case}");

                    if expect_reflection {
                        let source_id = response.source_id.unwrap();
                        let reflection = &upserts[1].1[0].payload;
                        assert_eq!(reflection.memory_type, MemoryType::JournalReflection);
                        assert_eq!(reflection.source_id, format!("reflection_{source_id}"));
                        assert_eq!(reflection.original_entry_id.as_deref(), Some(source_id.as_str()));
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_identical_submissions_are_not_deduplicated() {
        let harness = Harness::healthy();
        let orchestrator = harness.orchestrator();
        let first = orchestrator.save(request("Same words", true, true)).await.unwrap();
        let second = orchestrator.save(request("Same words", true, true)).await.unwrap();

        assert_ne!(first.source_id, second.source_id);

        let upserts = harness.vectors.upsert_calls().await;
        let ids: Vec<Uuid> = upserts.iter().flat_map(|(_, points)| points.iter().map(|p| p.id)).collect();
        assert_eq!(ids.len(), 4);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn test_fallback_ids_differ_for_same_timestamp() {
        let harness = Harness::healthy();
        let orchestrator = harness.orchestrator();
        let mut req = request("Memory only", false, true);
        req.entry_timestamp = Some("2024-05-01T09:30:00.000Z".to_string());

        let first = orchestrator.save(req.clone()).await.unwrap();
        let second = orchestrator.save(req).await.unwrap();

        let first_id = first.source_id.unwrap();
        assert!(first_id.starts_with("journal_2024-05-01T09-30-00-000Z_"));
        assert_ne!(Some(first_id), second.source_id);
    }

    #[tokio::test]
    async fn test_end_to_end_save_with_reflection() {
        let harness = Harness::new(
            MockRecordStore::new(),
            MockEmbeddingService::default(),
            MockVectorStore::new(),
            MockGenerationService::new("It sounds like work went well.")
        );
        let response = harness
            .orchestrator()
            .save(SaveJournalRequest {
                text: "Had a great day".to_string(),
                mood: Some("Happy".to_string()),
                tags: vec!["work".to_string()],
                entry_timestamp: None,
                save_to_notion: true,
                save_to_qdrant: true
            })
            .await
            .unwrap();

        assert_eq!(
            response,
            SaveJournalResponse::saved(
                Some("notion-page-1".to_string()),
                Some("It sounds like work went well.".to_string())
            )
        );

        let pages = harness.records.created_pages().await;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Had a great day");
        assert_eq!(pages[0].mood.as_deref(), Some("Happy"));

        let upserts = harness.vectors.upsert_calls().await;
        assert_eq!(upserts.len(), 2);
        assert!(upserts.iter().all(|(collection, _)| collection == COLLECTION));

        let entry = &upserts[0].1[0].payload;
        assert_eq!(entry.memory_type, MemoryType::JournalEntry);
        assert_eq!(entry.source_id, "notion-page-1");
        assert_eq!(entry.original_entry_id.as_deref(), Some("notion-page-1"));
        assert_eq!(entry.tags, vec!["journal", "work"]);
        assert_eq!(entry.mood.as_deref(), Some("Happy"));

        let reflection = &upserts[1].1[0].payload;
        assert_eq!(reflection.text, "It sounds like work went well.");
        assert_eq!(reflection.source_id, "reflection_notion-page-1");
        assert_eq!(reflection.tags, vec!["journal", "reflection", "work"]);
    }

    #[tokio::test]
    async fn test_durable_failure_is_fatal_and_skips_memory() {
        let harness = Harness::new(
            MockRecordStore::new().with_failing_create(),
            MockEmbeddingService::default(),
            MockVectorStore::new(),
            MockGenerationService::new("unused")
        );
        let err = harness
            .orchestrator()
            .save(request("Had a great day", true, true))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to save journal entry to Notion.");
        assert!(harness.embeddings.calls().await.is_empty());
        assert!(harness.vectors.upsert_calls().await.is_empty());
        assert!(harness.generation.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_degrades_when_durable() {
        let harness = Harness::new(
            MockRecordStore::new(),
            MockEmbeddingService::failing(),
            MockVectorStore::new(),
            MockGenerationService::new("reflection text")
        );
        let response = harness
            .orchestrator()
            .save(request("Had a great day", true, true))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.source_id.as_deref(), Some("notion-page-1"));
        assert!(response.reflection.is_none());
        assert!(harness.vectors.upsert_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_embedding_degrades_when_durable() {
        let harness = Harness::new(
            MockRecordStore::new(),
            MockEmbeddingService::returning_empty(),
            MockVectorStore::new(),
            MockGenerationService::new("reflection text")
        );
        let response = harness
            .orchestrator()
            .save(request("Had a great day", true, true))
            .await
            .unwrap();

        assert_eq!(response.source_id.as_deref(), Some("notion-page-1"));
        assert!(harness.vectors.upsert_calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_only_embedding_failure_is_fatal() {
        let harness = Harness::new(
            MockRecordStore::new(),
            MockEmbeddingService::failing(),
            MockVectorStore::new(),
            MockGenerationService::new("reflection text")
        );
        let err = harness
            .orchestrator()
            .save(request("Had a great day", false, true))
            .await
            .unwrap_err();

        assert!(matches!(err, JournalError::EmbeddingFailed { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to generate embedding for journal entry."
        );
        assert!(harness.generation.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_only_upsert_failure_is_fatal() {
        let harness = Harness::new(
            MockRecordStore::new(),
            MockEmbeddingService::default(),
            MockVectorStore::new().with_failing_upsert(),
            MockGenerationService::new("reflection text")
        );
        let err = harness
            .orchestrator()
            .save(request("Had a great day", false, true))
            .await
            .unwrap_err();

        assert!(matches!(err, JournalError::VectorStoreWriteFailed { .. }));
        assert_eq!(err.to_string(), "Failed to save journal entry to memory.");
    }

    #[tokio::test]
    async fn test_memory_only_never_stores_reflection() {
        let harness = Harness::healthy();
        let response = harness
            .orchestrator()
            .save(request("Memory only", false, true))
            .await
            .unwrap();

        assert!(response.source_id.unwrap().starts_with("journal_"));
        assert!(response.reflection.is_none());
        assert_eq!(harness.generation.requests().await.len(), 1);

        let upserts = harness.vectors.upsert_calls().await;
        assert_eq!(upserts.len(), 1);
        assert!(upserts[0].1[0].payload.original_entry_id.is_none());
    }

    #[tokio::test]
    async fn test_reflection_storage_failure_is_swallowed() {
        let harness = Harness::new(
            MockRecordStore::new(),
            MockEmbeddingService::default(),
            MockVectorStore::new().with_failing_upsert_of(MemoryType::JournalReflection),
            MockGenerationService::new("reflection text")
        );
        let response = harness
            .orchestrator()
            .save(request("Had a great day", true, true))
            .await
            .unwrap();

        assert_eq!(response.source_id.as_deref(), Some("notion-page-1"));
        assert!(response.reflection.is_none());
        assert_eq!(harness.vectors.upsert_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_reflection_embedding_failure_is_swallowed() {
        let harness = Harness::new(
            MockRecordStore::new(),
            MockEmbeddingService::failing_on("reflection text"),
            MockVectorStore::new(),
            MockGenerationService::new("reflection text")
        );
        let response = harness
            .orchestrator()
            .save(request("Had a great day", true, true))
            .await
            .unwrap();

        assert!(response.reflection.is_none());
        assert_eq!(harness.vectors.upsert_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_generation_request_parameters() {
        let harness = Harness::healthy();
        harness
            .orchestrator()
            .save(request("  Had a great day  ", true, true))
            .await
            .unwrap();

        let requests = harness.generation.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].request_type, RequestType::JournalReflection);
        assert_eq!(requests[0].primary_context, "Had a great day");
        assert_eq!(requests[0].temperature, 0.7);
        assert_eq!(requests[0].max_tokens, 500);
    }

    #[tokio::test]
    async fn test_supplied_timestamp_used_everywhere() {
        let harness = Harness::healthy();
        let mut req = request("Backdated", true, true);
        req.entry_timestamp = Some("2023-12-31T23:59:00.000Z".to_string());
        harness.orchestrator().save(req).await.unwrap();

        assert_eq!(
            harness.records.created_pages().await[0].date,
            "2023-12-31T23:59:00.000Z"
        );
        assert_eq!(
            harness.vectors.upsert_calls().await[0].1[0].payload.timestamp,
            "2023-12-31T23:59:00.000Z"
        );
    }

    #[test]
    fn test_entry_title_truncation() {
        assert_eq!(entry_title("Short"), "Short");

        let exact = "x".repeat(TITLE_MAX_CHARS);
        assert_eq!(entry_title(&exact), exact);

        let long = "é".repeat(TITLE_MAX_CHARS + 1);
        let title = entry_title(&long);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
    }

    #[test]
    fn test_fallback_source_id_shape() {
        let id = fallback_source_id("2024-05-01T09:30:00.000Z");
        let suffix = id
            .strip_prefix("journal_2024-05-01T09-30-00-000Z_")
            .unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_memory_tags_normalised() {
        let tags = memory_tags(
            &[JOURNAL_TAG],
            &[
                " Work ".to_string(),
                "work".to_string(),
                String::new(),
                "JOURNAL".to_string(),
                "Health".to_string()
            ]
        );
        assert_eq!(tags, vec!["journal", "work", "health"]);
    }

    #[test]
    fn test_request_toggles_default_to_true() {
        let request: SaveJournalRequest =
            serde_json::from_value(serde_json::json!({ "text": "hi" })).unwrap();
        assert!(request.save_to_notion);
        assert!(request.save_to_qdrant);
    }

    #[test]
    fn test_response_omits_missing_reflection() {
        let json = serde_json::to_value(SaveJournalResponse::saved(None, None)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "sourceId": null }));
    }
}
