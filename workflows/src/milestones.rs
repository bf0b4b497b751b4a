//! Career milestone reordering.
//!
//! Moving a milestone swaps its `order` with the neighbour in the requested
//! direction. The two record writes run concurrently; neither waits for or
//! undoes the other.

use crate::error::MilestoneError;
use orion_core::traits::RecordStore;
use orion_core::types::{MilestoneOrder, ReorderDirection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneReorder {
    pub milestones: Vec<MilestoneOrder>,
    pub milestone_id: String,
    pub direction: ReorderDirection
}

/// Computes the two milestones whose `order` values change.
///
/// Neighbours sharing an `order` are renumbered to `order` and `order + 1`
/// so the moved milestone still lands on the requested side.
pub fn plan_swap(
    request: &MilestoneReorder
) -> Result<(MilestoneOrder, MilestoneOrder), MilestoneError> {
    let mut sorted = request.milestones.clone();
    sorted.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

    let position = sorted
        .iter()
        .position(|m| m.id == request.milestone_id)
        .ok_or_else(|| MilestoneError::NotFound {
            id: request.milestone_id.clone()
        })?;

    let neighbour = match request.direction {
        ReorderDirection::Up => position.checked_sub(1),
        ReorderDirection::Down => Some(position + 1).filter(|&i| i < sorted.len())
    }
    .ok_or_else(|| MilestoneError::AtBoundary {
        id: request.milestone_id.clone(),
        direction: request.direction
    })?;

    let target = &sorted[position];
    let other = &sorted[neighbour];
    let (target_order, other_order) = if target.order == other.order {
        let next = target.order.saturating_add(1);
        match request.direction {
            ReorderDirection::Up => (target.order, next),
            ReorderDirection::Down => (next, target.order)
        }
    } else {
        (other.order, target.order)
    };

    Ok((
        MilestoneOrder {
            id: target.id.clone(),
            order: target_order
        },
        MilestoneOrder {
            id: other.id.clone(),
            order: other_order
        }
    ))
}

/// Applies the swap and returns the milestones with their new orders.
pub async fn reorder_milestones(
    records: &dyn RecordStore,
    request: &MilestoneReorder
) -> Result<Vec<MilestoneOrder>, MilestoneError> {
    let (moved, displaced) = plan_swap(request)?;

    let (moved_result, displaced_result) = tokio::join!(
        records.update_milestone_order(&moved.id, moved.order),
        records.update_milestone_order(&displaced.id, displaced.order)
    );

    let mut failed = Vec::new();
    for (milestone, result) in [(&moved, moved_result), (&displaced, displaced_result)] {
        if let Err(e) = result {
            tracing::warn!(error = %e, milestone_id = %milestone.id, "Milestone order update failed");
            failed.push(milestone.id.clone());
        }
    }

    if failed.is_empty() {
        Ok(vec![moved, displaced])
    } else {
        Err(MilestoneError::UpdateFailed { failed })
    }
}
