//! Habitica v3 task API.
//!
//! Every call is authenticated with the caller's own user id and API token.
//! Responses arrive in a `{success, data, message}` envelope; a
//! `success: false` envelope is reported as a status error even when the
//! HTTP status is 2xx.

use crate::http::{build_client, decode, join_url, record_failure, send};
use async_trait::async_trait;
use config::HabiticaConfig;
use errors::{ProviderError, Service};
use orion_core::traits::{HabiticaClient, ProviderResult};
use orion_core::types::{
    HabiticaCredentials, HabiticaTask, NewTodo, ScoreDirection, ScoreResult, TaskType
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub struct HabiticaApiClient {
    client: Client,
    config: HabiticaConfig
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>
}

#[derive(Debug, Serialize)]
struct CreateTaskRequest<'a> {
    #[serde(rename = "type")]
    task_type: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<f32>
}

impl HabiticaApiClient {
    pub fn new(config: HabiticaConfig) -> Result<Self, ProviderError> {
        let client = build_client(Service::Habitica, config.timeout_seconds)?;
        Ok(Self { client, config })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        credentials: &HabiticaCredentials
    ) -> RequestBuilder {
        self.client
            .request(method, join_url(&self.config.base_url, path))
            .header("x-api-user", &credentials.user_id)
            .header("x-api-key", &credentials.api_token)
            .header("x-client", &self.config.client_id)
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> ProviderResult<T> {
        let response = send(Service::Habitica, request).await?;
        let status = response.status().as_u16();
        let envelope: Envelope<T> = decode(Service::Habitica, response).await?;

        match envelope {
            Envelope {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            Envelope { success: true, .. } => {
                record_failure(Service::Habitica);
                Err(ProviderError::empty(Service::Habitica, "data"))
            }
            Envelope { message, error, .. } => {
                record_failure(Service::Habitica);
                Err(ProviderError::Status {
                    service: Service::Habitica,
                    status,
                    message: message
                        .or(error)
                        .unwrap_or_else(|| "request was not successful".to_string())
                })
            }
        }
    }
}

#[async_trait]
impl HabiticaClient for HabiticaApiClient {
    async fn list_tasks(
        &self,
        credentials: &HabiticaCredentials,
        task_type: TaskType
    ) -> ProviderResult<Vec<HabiticaTask>> {
        let path = format!("tasks/user?type={task_type}");
        self.call(self.request(Method::GET, &path, credentials))
            .await
    }

    async fn score_task(
        &self,
        credentials: &HabiticaCredentials,
        task_id: &str,
        direction: ScoreDirection
    ) -> ProviderResult<ScoreResult> {
        let path = format!(
            "tasks/{}/score/{direction}",
            urlencoding::encode(task_id)
        );
        self.call(self.request(Method::POST, &path, credentials))
            .await
    }

    async fn create_todo(
        &self,
        credentials: &HabiticaCredentials,
        todo: &NewTodo
    ) -> ProviderResult<HabiticaTask> {
        let body = CreateTaskRequest {
            task_type: "todo",
            text: &todo.text,
            notes: todo.notes.as_deref(),
            priority: todo.priority
        };
        self.call(
            self.request(Method::POST, "tasks/user", credentials)
                .json(&body)
        )
        .await
    }
}
