//! Simulation result value
//!
//! The engine's only output, handed to the (external) reporting layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Aggregated outcome of one run
///
/// Serializes with the field names the reporting layer expects
/// (`totalInfected`, `iterationNumber`, `rMap`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutbreakResult {
    /// Distinct targets of retained infection edges (index case excluded)
    pub total_infected: usize,

    /// Highest generation reached by any infected employee
    pub iteration_number: u32,

    /// Generation (≥ 1) → average outgoing infection edges per employee of that generation
    pub r_map: BTreeMap<u32, f64>,
}

impl fmt::Display for OutbreakResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Total infected: {}, Number of iterations: {}, R: {{",
            self.total_infected, self.iteration_number
        )?;
        for (i, (generation, r)) in self.r_map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", generation, r)?;
        }
        write!(f, "}}}}")
    }
}
