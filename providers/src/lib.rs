//! # Orion Providers
//!
//! HTTP implementations of the collaborator traits defined in `orion_core`.
//!
//! - [`NotionRecordStore`]: journal pages, opportunities, profile, milestones
//! - [`QdrantVectorStore`]: point upsert and filtered similarity search (REST)
//! - [`OpenAiEmbeddingService`]: OpenAI-compatible `/embeddings` with an LRU cache
//! - [`OpenAiGenerationService`]: OpenAI-compatible `/chat/completions`
//! - [`HabiticaApiClient`]: Habitica v3 task API
//!
//! [`mock`] holds in-process stand-ins with call recorders for tests.

mod http;

pub mod embedding;
pub mod habitica;
pub mod llm;
pub mod mock;
pub mod notion;
pub mod qdrant;

pub use embedding::OpenAiEmbeddingService;
pub use habitica::HabiticaApiClient;
pub use llm::OpenAiGenerationService;
pub use notion::NotionRecordStore;
pub use qdrant::QdrantVectorStore;
