//! Direct memory operations: embedding generation, point upsert and search.

use crate::error::MemoryError;
use errors::ValidationError;
use orion_core::traits::{EmbeddingService, VectorStore};
use orion_core::types::{MemoryFilter, MemoryPoint, MemoryQuery, ScoredMemoryPoint};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEmbeddingsRequest {
    #[serde(default)]
    pub texts: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    #[serde(default)]
    pub points: Vec<MemoryPoint>,
    #[serde(default)]
    pub collection_name: Option<String>
}

/// `queryText` and `query` are accepted interchangeably.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, alias = "query")]
    pub query_text: Option<String>,
    #[serde(default)]
    pub filter: Option<MemoryFilter>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub collection_name: Option<String>
}

pub async fn generate_embeddings(
    embeddings: &dyn EmbeddingService,
    request: &GenerateEmbeddingsRequest
) -> Result<Vec<Vec<f32>>, MemoryError> {
    if request.texts.is_empty() {
        return Err(ValidationError::missing("texts").into());
    }
    Ok(embeddings.embed_batch(&request.texts).await?)
}

/// Upserts `request.points` into the requested collection, or `default_collection`.
/// Returns the number of points written.
pub async fn upsert_points(
    vectors: &dyn VectorStore,
    default_collection: &str,
    request: &UpsertRequest
) -> Result<usize, MemoryError> {
    if request.points.is_empty() {
        return Err(ValidationError::missing("points").into());
    }
    if request.points.iter().any(|point| point.vector.is_empty()) {
        return Err(ValidationError::invalid("points", "every point needs a non-empty vector").into());
    }

    let collection = request
        .collection_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(default_collection);
    vectors.upsert(collection, &request.points).await?;

    tracing::info!(collection, count = request.points.len(), "Memory points upserted");
    Ok(request.points.len())
}

pub async fn search_memory(
    embeddings: &dyn EmbeddingService,
    vectors: &dyn VectorStore,
    default_collection: &str,
    request: &SearchRequest
) -> Result<Vec<ScoredMemoryPoint>, MemoryError> {
    let query_text = request
        .query_text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ValidationError::missing("queryText"))?;

    let vector = embeddings.embed(query_text).await?;
    let collection = request
        .collection_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(default_collection);

    let query = MemoryQuery {
        vector,
        filter: request.filter.clone().filter(|filter| !filter.is_empty()),
        limit: clamp_limit(request.limit)
    };
    Ok(vectors.search(collection, &query).await?)
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT)
}
