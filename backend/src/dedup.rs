//! Deduplicator
//!
//! Collapses redundant transmission claims so every infected employee keeps
//! exactly one parent. Among a target's incoming edges the one retained is
//! the minimum of [`crate::models::InfectionEdge::retention_order`]: earliest day, then
//! lowest source id, then lowest edge id. Re-running is a no-op.

use crate::models::EdgeId;
use crate::orchestrator::SimulationError;
use crate::store::GraphStore;

/// Delete every incoming edge but the retained one; returns how many were deleted
pub fn remove_duplicate_infections<S: GraphStore + ?Sized>(
    store: &mut S,
) -> Result<usize, SimulationError> {
    let groups = store.duplicate_infection_edges_by_target()?;

    let mut redundant: Vec<EdgeId> = Vec::new();
    for edges in groups.values() {
        let Some(kept) = edges.iter().min_by(|a, b| a.retention_order(b)) else {
            continue;
        };
        redundant.extend(
            edges
                .iter()
                .filter(|edge| edge.id != kept.id)
                .map(|edge| edge.id),
        );
    }

    if !redundant.is_empty() {
        store.delete_edges(&redundant)?;
    }

    tracing::debug!(
        targets = groups.len(),
        removed = redundant.len(),
        "duplicate infection edges removed"
    );

    Ok(redundant.len())
}
