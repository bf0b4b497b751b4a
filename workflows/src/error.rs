//! Workflow error types.
//!
//! The `Display` text of the journal errors is shown to the user verbatim.

use errors::{ProviderError, ValidationError};
use orion_core::types::ReorderDirection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Journal entry text cannot be empty.")]
    InvalidInput,

    #[error("Failed to save journal entry to Notion.")]
    DurableStoreWriteFailed {
        #[source]
        source: ProviderError
    },

    #[error("Failed to generate embedding for journal entry.")]
    EmbeddingFailed {
        #[source]
        source: ProviderError
    },

    #[error("Failed to save journal entry to memory.")]
    VectorStoreWriteFailed {
        #[source]
        source: ProviderError
    }
}

/// Why a reflection was not produced or not stored. Never fails a save.
#[derive(Debug, Error)]
pub enum ReflectionError {
    #[error("Reflection generation failed: {0}")]
    Generation(#[source] ProviderError),

    #[error("Reflection requires a durably stored entry whose memory write succeeded")]
    NotEligible,

    #[error("Reflection embedding failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("Reflection memory write failed: {0}")]
    Store(#[source] ProviderError)
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Opportunity {id} not found")]
    OpportunityNotFound { id: String },

    #[error("Failed to fetch opportunity: {source}")]
    OpportunityFetch {
        #[source]
        source: ProviderError
    },

    #[error("Failed to generate evaluation: {source}")]
    Generation {
        #[source]
        source: ProviderError
    },

    #[error("Failed to parse evaluation response as JSON")]
    Parse { raw_content: String }
}

#[derive(Debug, Error)]
pub enum MilestoneError {
    #[error("Milestone {id} not found")]
    NotFound { id: String },

    #[error("Milestone {id} cannot move {direction}")]
    AtBoundary {
        id: String,
        direction: ReorderDirection
    },

    #[error("Failed to update milestone order for {}", .failed.join(", "))]
    UpdateFailed { failed: Vec<String> }
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError)
}
