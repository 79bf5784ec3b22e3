//! Aggregator
//!
//! Turns the deduplicated infection graph into an [`OutbreakResult`].

use crate::models::OutbreakResult;
use crate::orchestrator::SimulationError;
use crate::store::GraphStore;

/// Total infected, generation depth and per-generation effective R
///
/// `r_map` covers generations ≥ 1; employees of a generation that infected
/// nobody count as `0` in its average.
pub fn aggregate<S: GraphStore + ?Sized>(store: &S) -> Result<OutbreakResult, SimulationError> {
    Ok(OutbreakResult {
        total_infected: store.count_distinct_infected_targets()?,
        iteration_number: store.max_iteration()?.unwrap_or(0),
        r_map: store.average_out_degree_by_generation()?,
    })
}
