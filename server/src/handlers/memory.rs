use axum::{Json, extract::State};
use orion_core::types::ScoredMemoryPoint;
use serde::Serialize;
use std::sync::Arc;
use workflows::memory::{
    GenerateEmbeddingsRequest, SearchRequest, UpsertRequest, generate_embeddings, search_memory,
    upsert_points
};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EmbeddingsResponse {
    pub success: bool,
    pub embeddings: Vec<Vec<f32>>
}

#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub success: bool,
    pub upserted: usize
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<ScoredMemoryPoint>
}

/// POST /memory/generate-embeddings
pub async fn generate(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<GenerateEmbeddingsRequest>
) -> Result<Json<EmbeddingsResponse>, ApiError> {
    let embeddings =
        generate_embeddings(state.collaborators.embeddings.as_ref(), &request).await?;
    Ok(Json(EmbeddingsResponse {
        success: true,
        embeddings
    }))
}

/// POST /memory/upsert
pub async fn upsert(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<UpsertRequest>
) -> Result<Json<UpsertResponse>, ApiError> {
    let upserted = upsert_points(
        state.collaborators.vectors.as_ref(),
        state.collection(),
        &request
    )
    .await?;
    Ok(Json(UpsertResponse {
        success: true,
        upserted
    }))
}

/// POST /memory/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SearchRequest>
) -> Result<Json<SearchResponse>, ApiError> {
    let c = &state.collaborators;
    let results = search_memory(
        c.embeddings.as_ref(),
        c.vectors.as_ref(),
        state.collection(),
        &request
    )
    .await?;
    Ok(Json(SearchResponse {
        success: true,
        results
    }))
}
