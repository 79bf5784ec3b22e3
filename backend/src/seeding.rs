//! Seeder
//!
//! Materializes the synthetic index case and attributes every employee that
//! is already infected to it. The attribution is bookkeeping, not a causal
//! claim: it gives the generation model a single root.
//!
//! The index case sits at generation 0 and the attributed employees at
//! generation 1, so `target.iteration == source.iteration + 1` holds for the
//! seeding edges as for every other infection edge.

use crate::models::{Day, Employee, EmployeeId};
use crate::orchestrator::SimulationError;
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generation assigned to employees infected before the run
pub const SEEDED_GENERATION: u32 = 1;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeedError {
    #[error("No infected employees to attribute to an index case")]
    NoInfectedNodes,

    #[error("No free employee id left for the index case")]
    IdSpaceExhausted,
}

/// Index case created by [`create_index_case`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCase {
    pub id: EmployeeId,

    /// Day stamped on every seeding edge
    pub day: Day,

    /// Number of pre-existing infected employees attributed to the index case
    pub attributed: usize,
}

/// Day on which the index case is assumed to have infected everyone
///
/// `investigation_day − incubation − minimal_incubation`
pub fn seed_day(investigation_day: Day, incubation: Day, minimal_incubation: Day) -> Day {
    investigation_day
        .saturating_sub(incubation)
        .saturating_sub(minimal_incubation)
}

/// Create the index case and one infection edge to each infected employee
///
/// Validation happens before the first mutation, so a failure leaves the
/// store untouched.
pub fn create_index_case<S: GraphStore + ?Sized>(
    store: &mut S,
    day: Day,
) -> Result<IndexCase, SimulationError> {
    let infected = store.infected_nodes()?;
    if infected.is_empty() {
        return Err(SeedError::NoInfectedNodes.into());
    }

    let id = match store.max_employee_id()? {
        None => 0,
        Some(max) => max.checked_add(1).ok_or(SeedError::IdSpaceExhausted)?,
    };

    store.load_employees(&[Employee::index_case(id)])?;
    for &target in &infected {
        store.mark_infected(target, SEEDED_GENERATION)?;
        store.create_infection_edge(id, target, day)?;
    }

    tracing::info!(index_case = id, day, attributed = infected.len(), "index case seeded");

    Ok(IndexCase {
        id,
        day,
        attributed: infected.len(),
    })
}
