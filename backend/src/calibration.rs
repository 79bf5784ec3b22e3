//! Calibrator
//!
//! Derives the baseline reproduction number and incubation period from the
//! employees already labeled infected, before any synthetic state exists.
//!
//! - **R**: max over infected employees of `(infected neighbors − 1)`
//! - **Incubation**: max of `investigation_day − contact.day` over contacts
//!   between two infected employees that did not happen on the investigation day

use crate::models::{Day, EmployeeId};
use crate::orchestrator::SimulationError;
use crate::store::{GraphStore, ALL_DAYS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Missing baseline data; nothing partial is produced
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalibrationError {
    #[error("No infected employees to calibrate R from")]
    NoInfectedNodes,

    #[error("No contact between infected employees outside investigation day {investigation_day}")]
    NoQualifyingContacts { investigation_day: Day },
}

/// Calibrated baseline parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    /// Baseline branching cap (may be ≤ 0, meaning no growth)
    pub r: i64,

    /// Longest observed exposure-to-investigation gap in days
    pub incubation: Day,
}

/// Compute both baseline parameters
pub fn calibrate<S: GraphStore + ?Sized>(
    store: &S,
    investigation_day: Day,
) -> Result<Calibration, SimulationError> {
    Ok(Calibration {
        r: compute_r(store)?,
        incubation: compute_incubation(store, investigation_day)?,
    })
}

/// Baseline reproduction number
///
/// Counts distinct infected neighbors per infected employee. An infected
/// employee with no infected neighbor contributes `-1`.
pub fn compute_r<S: GraphStore + ?Sized>(store: &S) -> Result<i64, SimulationError> {
    let infected = store.infected_nodes()?;
    let mut best: Option<i64> = None;

    for &id in &infected {
        let infected_neighbors: BTreeSet<EmployeeId> = store
            .contacts_of(id, ALL_DAYS)?
            .into_iter()
            .map(|(neighbor, _)| neighbor)
            .filter(|neighbor| infected.contains(neighbor))
            .collect();
        let candidate = infected_neighbors.len() as i64 - 1;
        best = Some(best.map_or(candidate, |b| b.max(candidate)));
    }

    best.ok_or_else(|| CalibrationError::NoInfectedNodes.into())
}

/// Incubation period relative to `investigation_day`
pub fn compute_incubation<S: GraphStore + ?Sized>(
    store: &S,
    investigation_day: Day,
) -> Result<Day, SimulationError> {
    let infected = store.infected_nodes()?;
    let mut best: Option<Day> = None;

    for &id in &infected {
        for (neighbor, day) in store.contacts_of(id, ALL_DAYS)? {
            if day == investigation_day || !infected.contains(&neighbor) {
                continue;
            }
            let gap = investigation_day.saturating_sub(day);
            best = Some(best.map_or(gap, |b| b.max(gap)));
        }
    }

    best.ok_or_else(|| CalibrationError::NoQualifyingContacts { investigation_day }.into())
}
