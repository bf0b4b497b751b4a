use axum::Json;
use orion_core::types::{SuggestedComponent, TailoringScore};
use serde::Serialize;
use workflows::cv::{ScoreRequest, SuggestRequest, score_tailoring, suggest_components};

use crate::error::ApiError;
use crate::extract::ApiJson;

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub suggestions: Vec<SuggestedComponent>
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub success: bool,
    pub score: TailoringScore
}

/// POST /cv/suggest
pub async fn suggest(
    ApiJson(request): ApiJson<SuggestRequest>
) -> Result<Json<SuggestResponse>, ApiError> {
    let suggestions = suggest_components(&request)?;
    Ok(Json(SuggestResponse {
        success: true,
        suggestions
    }))
}

/// POST /cv/score
pub async fn score(
    ApiJson(request): ApiJson<ScoreRequest>
) -> Result<Json<ScoreResponse>, ApiError> {
    let score = score_tailoring(&request)?;
    Ok(Json(ScoreResponse {
        success: true,
        score
    }))
}
