use axum::{Json, extract::State};
use orion_core::types::MilestoneOrder;
use serde::Serialize;
use std::sync::Arc;
use workflows::{MilestoneReorder, reorder_milestones};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub success: bool,
    pub milestones: Vec<MilestoneOrder>
}

/// POST /narrative/milestones/reorder
pub async fn reorder(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<MilestoneReorder>
) -> Result<Json<ReorderResponse>, ApiError> {
    let milestones = reorder_milestones(state.collaborators.records.as_ref(), &request).await?;
    tracing::info!(
        milestone_id = %request.milestone_id,
        direction = %request.direction,
        "Milestone reordered"
    );
    Ok(Json(ReorderResponse {
        success: true,
        milestones
    }))
}
