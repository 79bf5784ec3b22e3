//! Checkpoint - Store-Independent Graph Snapshots
//!
//! Captures the employees and infection edges of any [`GraphStore`] in a
//! canonical order so runs on different store realizations can be compared
//! and their invariants checked without touching a query dialect.
//!
//! # Critical Invariants (checked by [`validate_snapshot`])
//!
//! - **Single parent**: every infected employee but the index case has
//!   exactly one incoming infection edge
//! - **Generation step**: `target.iteration == source.iteration + 1` on
//!   every infection edge
//! - **Root**: the index case has no incoming edge

use crate::models::{Day, Employee, EmployeeId};
use crate::orchestrator::SimulationError;
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete infection graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Store realization the snapshot was taken from
    pub backend: String,

    /// All employees sorted by id
    pub employees: Vec<Employee>,

    /// All infection edges sorted by (target, source, day)
    pub infections: Vec<InfectionSnapshot>,

    /// SHA256 hash of the run configuration
    pub config_hash: String,
}

/// Infection edge without its store-assigned id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InfectionSnapshot {
    pub target: EmployeeId,
    pub source: EmployeeId,
    pub day: Day,
}

impl GraphSnapshot {
    /// Capture the current state of `store`
    pub fn capture<S: GraphStore + ?Sized, C: Serialize>(
        store: &S,
        config: &C,
    ) -> Result<Self, SimulationError> {
        let mut infections: Vec<InfectionSnapshot> = store
            .infection_edges()?
            .into_iter()
            .map(|edge| InfectionSnapshot {
                target: edge.target,
                source: edge.source,
                day: edge.day,
            })
            .collect();
        infections.sort_unstable();

        Ok(Self {
            backend: store.backend_name().to_string(),
            employees: store.employees()?,
            infections,
            config_hash: compute_config_hash(config)?,
        })
    }

    /// SHA256 over employees and infections only
    ///
    /// Equal digests mean two stores hold the same graph state, whatever
    /// their backend.
    pub fn state_digest(&self) -> Result<String, SimulationError> {
        let json = serde_json::to_string(&(&self.employees, &self.infections)).map_err(|e| {
            SimulationError::SerializationError(format!("Snapshot serialization failed: {}", e))
        })?;
        Ok(sha256_hex(json.as_bytes()))
    }

    /// Whether two snapshots of the same configuration hold the same graph
    ///
    /// Snapshots taken under different configurations are not comparable and
    /// yield [`SimulationError::ConfigMismatch`].
    pub fn same_state_as(&self, other: &GraphSnapshot) -> Result<bool, SimulationError> {
        if self.config_hash != other.config_hash {
            return Err(SimulationError::ConfigMismatch {
                left: self.config_hash.clone(),
                right: other.config_hash.clone(),
            });
        }
        Ok(self.state_digest()? == other.state_digest()?)
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA256 of a configuration's JSON value
///
/// `serde_json::Map` keeps its keys sorted, so field order never leaks into
/// the hash.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;
    Ok(sha256_hex(value.to_string().as_bytes()))
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate infection graph invariants after deduplication
pub fn validate_snapshot(
    snapshot: &GraphSnapshot,
    index_case: EmployeeId,
) -> Result<(), SimulationError> {
    let employees: HashMap<EmployeeId, &Employee> = snapshot
        .employees
        .iter()
        .map(|employee| (employee.id(), employee))
        .collect();

    let iteration_of = |id: EmployeeId| {
        employees
            .get(&id)
            .and_then(|employee| employee.iteration())
            .ok_or_else(|| {
                SimulationError::InvariantViolation(format!(
                    "infection edge references employee {} without a generation",
                    id
                ))
            })
    };

    // 1. Generation step on every edge
    let mut incoming: HashMap<EmployeeId, usize> = HashMap::new();
    for edge in &snapshot.infections {
        let source = iteration_of(edge.source)?;
        let target = iteration_of(edge.target)?;
        if source.checked_add(1) != Some(target) {
            return Err(SimulationError::InvariantViolation(format!(
                "edge {} -> {} spans generations {} -> {}",
                edge.source, edge.target, source, target
            )));
        }
        *incoming.entry(edge.target).or_insert(0) += 1;
    }

    // 2. Single parent per infected employee, none for the index case
    for employee in snapshot.employees.iter().filter(|e| e.is_infected()) {
        let parents = incoming.get(&employee.id()).copied().unwrap_or(0);
        let expected = if employee.id() == index_case { 0 } else { 1 };
        if parents != expected {
            return Err(SimulationError::InvariantViolation(format!(
                "employee {} has {} incoming infection edges, expected {}",
                employee.id(),
                parents,
                expected
            )));
        }
    }

    Ok(())
}
