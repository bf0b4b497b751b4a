//! OpenAI-compatible embeddings client with an in-process LRU cache.

use crate::http::{build_client, decode, join_url, record_failure, send};
use async_trait::async_trait;
use config::EmbeddingConfig;
use errors::{ProviderError, Service};
use lru::LruCache;
use orion_core::traits::{EmbeddingService, ProviderResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct OpenAiEmbeddingService {
    client: Client,
    config: EmbeddingConfig,
    cache: Arc<RwLock<LruCache<String, Vec<f32>>>>
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String]
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>
}

impl OpenAiEmbeddingService {
    pub fn new(config: EmbeddingConfig) -> Result<Self, ProviderError> {
        let client = build_client(Service::Embedding, config.timeout_seconds)?;
        let capacity = NonZeroUsize::new(config.cache_size).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            client,
            config,
            cache: Arc::new(RwLock::new(LruCache::new(capacity)))
        })
    }

    async fn request_embeddings(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        let mut request = self
            .client
            .post(join_url(&self.config.base_url, "embeddings"))
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts
            });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response: EmbeddingResponse =
            decode(Service::Embedding, send(Service::Embedding, request).await?).await?;

        if response.data.len() != texts.len() {
            record_failure(Service::Embedding);
            return Err(ProviderError::decode(
                Service::Embedding,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.data.len()
                )
            ));
        }

        let mut data = response.data;
        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingService {
    async fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        {
            let mut cache = self.cache.write().await;
            for (i, text) in texts.iter().enumerate() {
                if let Some(cached) = cache.get(text) {
                    results.push(cached.clone());
                } else {
                    results.push(Vec::new());
                    uncached_texts.push(text.clone());
                    uncached_indices.push(i);
                }
            }
        }

        if uncached_texts.is_empty() {
            return Ok(results);
        }

        tracing::debug!(
            cached = texts.len() - uncached_texts.len(),
            requested = uncached_texts.len(),
            "Requesting embeddings"
        );
        let embeddings = self.request_embeddings(&uncached_texts).await?;

        let mut cache = self.cache.write().await;
        for ((index, text), embedding) in uncached_indices
            .into_iter()
            .zip(uncached_texts)
            .zip(embeddings)
        {
            if !embedding.is_empty() {
                cache.put(text, embedding.clone());
            }
            results[index] = embedding;
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> OpenAiEmbeddingService {
        OpenAiEmbeddingService::new(EmbeddingConfig {
            base_url: server.uri(),
            api_key: Some("sk-test".to_string()),
            ..EmbeddingConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_embed_batch_orders_by_index() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "text-embedding-3-small",
                "input": ["first", "second"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "index": 1, "embedding": [0.2, 0.2] },
                    { "index": 0, "embedding": [0.1, 0.1] }
                ]
            })))
            .mount(&server)
            .await;

        let embeddings = service(&server)
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings, vec![vec![0.1, 0.1], vec![0.2, 0.2]]);
    }

    #[tokio::test]
    async fn test_cached_text_is_not_requested_again() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "index": 0, "embedding": [0.5] }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service(&server);
        let first = service.embed("Had a great day").await.unwrap();
        let second = service.embed("Had a great day").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_embedding_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "index": 0, "embedding": [] }]
            })))
            .mount(&server)
            .await;

        let err = service(&server).embed("text").await.unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult { .. }));
    }

    #[tokio::test]
    async fn test_count_mismatch_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let err = service(&server).embed("text").await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_is_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = service(&server).embed("text").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 429, .. }));
    }
}
