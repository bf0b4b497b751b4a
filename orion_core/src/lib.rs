//! # Orion Core
//!
//! Shared types and collaborator traits for Orion.
//!
//! This crate provides:
//! - Journal, memory, opportunity, milestone, Habitica and CV types
//! - The traits every upstream collaborator is reached through
//!   ([`RecordStore`], [`EmbeddingService`], [`VectorStore`],
//!   [`GenerationService`], [`HabiticaClient`])

pub mod traits;
pub mod types;

pub use traits::{
    EmbeddingService, GenerationService, HabiticaClient, ProviderResult, RecordStore, VectorStore
};
pub use types::{
    GenerationRequest, JournalEntry, JournalEntryRecord, MemoryFilter, MemoryPayload, MemoryPoint,
    MemoryQuery, MemoryType, NewJournalPage, Opportunity, OpportunityEvaluation, RequestType,
    ScoredMemoryPoint, UserProfile
};
