use axum::{
    Json,
    body::Bytes,
    extract::{Path, State}
};
use std::sync::Arc;
use workflows::{EvaluationOutcome, EvaluationRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /opportunity/{id}/evaluation
///
/// The body is optional; an empty body evaluates without company web
/// context.
pub async fn evaluate_opportunity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes
) -> Result<Json<EvaluationOutcome>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        EvaluationRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let outcome = state.evaluator().evaluate(&id, &request).await?;
    tracing::info!(
        opportunity_id = %id,
        fit_score = outcome.evaluation.fit_score_out_of_10,
        "Opportunity evaluated"
    );
    Ok(Json(outcome))
}
