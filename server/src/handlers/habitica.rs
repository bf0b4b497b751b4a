//! Habitica proxy. Credentials travel in each request body and are never
//! stored.

use axum::{Json, extract::State};
use errors::ValidationError;
use orion_core::types::{
    HabiticaCredentials, HabiticaTask, NewTodo, ScoreDirection, ScoreResult, TaskType
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFields {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub api_token: String
}

impl CredentialFields {
    fn into_credentials(self) -> Result<HabiticaCredentials, ValidationError> {
        let user_id = self.user_id.trim();
        let api_token = self.api_token.trim();
        if user_id.is_empty() {
            return Err(ValidationError::missing("userId"));
        }
        if api_token.is_empty() {
            return Err(ValidationError::missing("apiToken"));
        }
        Ok(HabiticaCredentials {
            user_id: user_id.to_string(),
            api_token: api_token.to_string()
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct TasksRequest {
    #[serde(flatten)]
    pub credentials: CredentialFields,
    #[serde(default, rename = "type")]
    pub task_type: TaskType
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTaskRequest {
    #[serde(flatten)]
    pub credentials: CredentialFields,
    #[serde(default)]
    pub task_id: String,
    pub direction: ScoreDirection
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(flatten)]
    pub credentials: CredentialFields,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: Option<f32>
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub success: bool,
    pub tasks: Vec<HabiticaTask>
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub success: bool,
    pub result: ScoreResult
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub success: bool,
    pub task: HabiticaTask
}

/// POST /habitica/tasks
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<TasksRequest>
) -> Result<Json<TasksResponse>, ApiError> {
    let credentials = request.credentials.into_credentials()?;
    let tasks = state
        .collaborators
        .habitica
        .list_tasks(&credentials, request.task_type)
        .await?;
    Ok(Json(TasksResponse {
        success: true,
        tasks
    }))
}

/// POST /habitica/tasks/score
pub async fn score_task(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ScoreTaskRequest>
) -> Result<Json<ScoreResponse>, ApiError> {
    let credentials = request.credentials.into_credentials()?;
    let task_id = request.task_id.trim();
    if task_id.is_empty() {
        return Err(ValidationError::missing("taskId").into());
    }

    let result = state
        .collaborators
        .habitica
        .score_task(&credentials, task_id, request.direction)
        .await?;
    Ok(Json(ScoreResponse {
        success: true,
        result
    }))
}

/// POST /habitica/todo
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateTodoRequest>
) -> Result<Json<TodoResponse>, ApiError> {
    let credentials = request.credentials.into_credentials()?;
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ValidationError::missing("text").into());
    }

    let todo = NewTodo {
        text: text.to_string(),
        notes: request.notes.filter(|notes| !notes.trim().is_empty()),
        priority: request.priority
    };
    let task = state
        .collaborators
        .habitica
        .create_todo(&credentials, &todo)
        .await?;
    Ok(Json(TodoResponse {
        success: true,
        task
    }))
}
