//! Generation steps and the two-phase driver

use super::jitter::randomize;
use crate::models::{Day, EmployeeId};
use crate::orchestrator::SimulationError;
use crate::rng::RandomSource;
use crate::store::{GraphStore, ALL_DAYS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Earliest plausible gap, in days, between an infection and onward transmission
pub const MINIMAL_INCUBATION: Day = 2;

/// Parameters of one propagation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// True horizon of the replay pass
    pub investigation_day: Day,

    /// Half-width of the per-step branching cap jitter (0 = no jitter)
    pub random_factor: u32,

    /// Floor on infection-to-transmission gap, also the bound-pass offset
    pub minimal_incubation: Day,
}

impl PropagationConfig {
    /// Day bound of the bound pass
    pub fn minimal_day(&self) -> Day {
        self.investigation_day.saturating_sub(self.minimal_incubation)
    }
}

/// What one generation step did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Generation of the sources (targets land in `generation + 1`)
    pub generation: u32,

    pub day_bound: Day,

    /// Branching cap shared by every source of the step
    pub effective_r: i64,

    pub sources: usize,

    /// Distinct employees infected by this step
    pub new_infections: usize,

    /// Infection edges created (≥ `new_infections` before deduplication)
    pub edges_created: usize,
}

/// Both passes of a propagation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationOutcome {
    /// Steps executed by the bound pass, replayed by the replay pass
    pub generations: u32,

    pub bound_pass: Vec<StepOutcome>,

    pub replay_pass: Vec<StepOutcome>,
}

impl PropagationOutcome {
    pub fn bound_pass_infections(&self) -> usize {
        self.bound_pass.iter().map(|step| step.new_infections).sum()
    }

    pub fn replay_pass_infections(&self) -> usize {
        self.replay_pass.iter().map(|step| step.new_infections).sum()
    }
}

/// Transmission computed in the read phase, applied in the write phase
#[derive(Debug, Clone, Copy)]
struct PlannedInfection {
    source: EmployeeId,
    target: EmployeeId,
    day: Day,
}

/// Run one generation step
///
/// 1. Sources are the infected employees of `generation`
/// 2. One jittered branching cap is drawn for the whole step
/// 3. A source's eligible contacts are neighbors met on a day in
///    `[parent_day + minimal_incubation, day_bound]`
/// 4. The `effective_r` eligible contacts with the highest ids are selected
/// 5. Every contact (any day) to a selected, not yet infected neighbor becomes
///    an infection edge; the neighbor joins `generation + 1`
///
/// All reads see the graph as it was before the step. Writes are buffered
/// until every source has been evaluated, so a target reached from several
/// sources receives several edges.
pub fn generation_step<S, R>(
    store: &mut S,
    rng: &mut R,
    config: &PropagationConfig,
    generation: u32,
    day_bound: Day,
    r: i64,
) -> Result<StepOutcome, SimulationError>
where
    S: GraphStore + ?Sized,
    R: RandomSource + ?Sized,
{
    let next_generation = generation.checked_add(1).ok_or_else(|| {
        SimulationError::InvariantViolation(format!("generation {} overflows", generation))
    })?;

    let sources = store.nodes_at_iteration(generation)?;
    let effective_r = randomize(r, config.random_factor, rng);
    let cap = usize::try_from(effective_r).unwrap_or(0);
    let infected = store.infected_nodes()?;

    // Read phase
    let mut planned: Vec<PlannedInfection> = Vec::new();
    for &source in &sources {
        let (_, parent_day) = store.parent_edge_of(source)?.ok_or_else(|| {
            SimulationError::InvariantViolation(format!(
                "employee {} is infected in generation {} without a parent edge",
                source, generation
            ))
        })?;

        let earliest = parent_day.saturating_add(config.minimal_incubation);
        if cap == 0 || earliest > day_bound {
            continue;
        }

        let eligible: BTreeSet<EmployeeId> = store
            .contacts_of(source, earliest..=day_bound)?
            .into_iter()
            .map(|(neighbor, _)| neighbor)
            .collect();
        let selected: BTreeSet<EmployeeId> = eligible.into_iter().rev().take(cap).collect();

        planned.extend(
            store
                .contacts_of(source, ALL_DAYS)?
                .into_iter()
                .filter(|(neighbor, _)| selected.contains(neighbor) && !infected.contains(neighbor))
                .map(|(target, day)| PlannedInfection {
                    source,
                    target,
                    day,
                }),
        );
    }

    // Write phase
    let mut newly_infected = BTreeSet::new();
    for infection in &planned {
        if newly_infected.insert(infection.target) {
            store.mark_infected(infection.target, next_generation)?;
        }
        store.create_infection_edge(infection.source, infection.target, infection.day)?;
    }

    let outcome = StepOutcome {
        generation,
        day_bound,
        effective_r,
        sources: sources.len(),
        new_infections: newly_infected.len(),
        edges_created: planned.len(),
    };

    tracing::debug!(
        generation,
        day_bound,
        effective_r,
        sources = outcome.sources,
        new_infections = outcome.new_infections,
        edges_created = outcome.edges_created,
        "generation step"
    );

    Ok(outcome)
}

/// Run the bound pass to a fixed point, then replay its generations
///
/// Zero growth is a valid outcome: with `r ≤ 0` the bound pass stops after
/// its first step.
pub fn propagate<S, R>(
    store: &mut S,
    rng: &mut R,
    config: &PropagationConfig,
    r: i64,
) -> Result<PropagationOutcome, SimulationError>
where
    S: GraphStore + ?Sized,
    R: RandomSource + ?Sized,
{
    let mut outcome = PropagationOutcome::default();

    let minimal_day = config.minimal_day();
    let mut generation = 0u32;
    loop {
        generation = generation.checked_add(1).ok_or_else(|| {
            SimulationError::InvariantViolation("bound pass never reached a fixed point".into())
        })?;
        let step = generation_step(store, rng, config, generation, minimal_day, r)?;
        let exhausted = step.new_infections == 0;
        outcome.bound_pass.push(step);
        if exhausted {
            break;
        }
    }
    outcome.generations = generation;

    tracing::info!(
        generations = generation,
        day_bound = minimal_day,
        new_infections = outcome.bound_pass_infections(),
        "bound pass finished"
    );

    for replayed in 1..=generation {
        let step = generation_step(store, rng, config, replayed, config.investigation_day, r)?;
        outcome.replay_pass.push(step);
    }

    tracing::info!(
        generations = generation,
        day_bound = config.investigation_day,
        new_infections = outcome.replay_pass_infections(),
        "replay pass finished"
    );

    Ok(outcome)
}
