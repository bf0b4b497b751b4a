//! Qdrant [`VectorStore`] over the REST API.

use crate::http::{build_client, decode, join_url, send};
use async_trait::async_trait;
use config::QdrantConfig;
use errors::{ProviderError, Service};
use orion_core::traits::{ProviderResult, VectorStore};
use orion_core::types::{MemoryFilter, MemoryPoint, MemoryQuery, ScoredMemoryPoint};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};

pub struct QdrantVectorStore {
    client: Client,
    config: QdrantConfig
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: &'a [MemoryPoint]
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a MemoryFilter>
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredMemoryPoint>
}

impl QdrantVectorStore {
    pub fn new(config: QdrantConfig) -> Result<Self, ProviderError> {
        let client = build_client(Service::Qdrant, config.timeout_seconds)?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, collection: &str, action: &str) -> RequestBuilder {
        let path = format!(
            "collections/{}/{}",
            urlencoding::encode(collection),
            action
        );
        let builder = self
            .client
            .request(method, join_url(&self.config.url, &path));
        match &self.config.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, collection: &str, points: &[MemoryPoint]) -> ProviderResult<()> {
        if points.is_empty() {
            return Ok(());
        }

        let request = self
            .request(Method::PUT, collection, "points?wait=true")
            .json(&UpsertRequest { points });
        send(Service::Qdrant, request).await?;

        tracing::debug!(collection, count = points.len(), "Upserted memory points");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &MemoryQuery
    ) -> ProviderResult<Vec<ScoredMemoryPoint>> {
        let body = SearchRequest {
            vector: &query.vector,
            limit: query.limit,
            with_payload: true,
            filter: query.filter.as_ref().filter(|filter| !filter.is_empty())
        };

        let request = self
            .request(Method::POST, collection, "points/search")
            .json(&body);
        let response: SearchResponse =
            decode(Service::Qdrant, send(Service::Qdrant, request).await?).await?;

        Ok(response.result)
    }
}
