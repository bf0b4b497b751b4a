use axum::{Json, extract::State};
use orion_core::types::JournalEntryRecord;
use serde::Serialize;
use std::sync::Arc;
use workflows::{SaveJournalRequest, SaveJournalResponse};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalListResponse {
    pub success: bool,
    pub journal_entries: Vec<JournalEntryRecord>
}

/// POST /journal/save
pub async fn save_journal(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SaveJournalRequest>
) -> Result<Json<SaveJournalResponse>, ApiError> {
    let response = state.journal().save(request).await?;
    Ok(Json(response))
}

/// GET /journal/list
pub async fn list_journal(
    State(state): State<Arc<AppState>>
) -> Result<Json<JournalListResponse>, ApiError> {
    let journal_entries = state.collaborators.records.list_journal_entries().await?;
    tracing::debug!(count = journal_entries.len(), "Journal entries listed");
    Ok(Json(JournalListResponse {
        success: true,
        journal_entries
    }))
}
