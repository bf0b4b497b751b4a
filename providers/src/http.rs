use errors::{ProviderError, Service};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Upstream error bodies are kept for diagnostics up to this many characters.
const MAX_ERROR_BODY: usize = 512;

pub(crate) fn build_client(service: Service, timeout_seconds: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ProviderError::http(service, e))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Sends `request`, turning transport failures and non-2xx statuses into
/// [`ProviderError`]s.
pub(crate) async fn send(service: Service, request: RequestBuilder) -> Result<Response, ProviderError> {
    let response = request.send().await.map_err(|e| {
        record_failure(service);
        ProviderError::http(service, e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    record_failure(service);
    tracing::debug!(service = %service, status = status.as_u16(), "Upstream returned error status");
    Err(ProviderError::Status {
        service,
        status: status.as_u16(),
        message: body.chars().take(MAX_ERROR_BODY).collect()
    })
}

pub(crate) async fn decode<T: DeserializeOwned>(
    service: Service,
    response: Response
) -> Result<T, ProviderError> {
    response.json::<T>().await.map_err(|e| {
        record_failure(service);
        ProviderError::decode(service, e)
    })
}

pub(crate) fn record_failure(service: Service) {
    metrics::counter!("orion_upstream_errors_total", "service" => service.as_str()).increment(1);
}
