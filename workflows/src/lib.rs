//! # Orion Workflows
//!
//! The request-scoped orchestration behind the HTTP routes. Every workflow
//! receives its collaborators as trait objects, so production providers and
//! in-process mocks are interchangeable.

pub mod cv;
pub mod error;
pub mod evaluation;
pub mod form;
pub mod journal;
pub mod memory;
pub mod milestones;
pub mod telemetry;

pub use error::{EvaluationError, JournalError, MemoryError, MilestoneError, ReflectionError};
pub use evaluation::{EvaluationOutcome, EvaluationRequest, OpportunityEvaluator};
pub use form::{FormError, JournalEntryForm};
pub use journal::{JournalOrchestrator, Reflection, SaveJournalRequest, SaveJournalResponse};
pub use milestones::{MilestoneReorder, reorder_milestones};
