//! Orchestrator Engine
//!
//! Runs one configuration against one store:
//!
//! ```text
//! 1. Calibrate R and incubation from the labeled infected employees
//! 2. Seed the index case on investigation_day − incubation − minimal_incubation
//! 3. Propagate (bound pass, then replay pass)
//! 4. Remove duplicate infection edges
//! 5. Validate the infection graph
//! 6. Aggregate the result
//! ```
//!
//! A calibration or seeding failure aborts before any further mutation and
//! no result is produced. Zero growth is not a failure.
//!
//! # Example
//!
//! ```rust
//! use outbreak_simulator_core_rs::orchestrator::{Orchestrator, OrchestratorConfig};
//! use outbreak_simulator_core_rs::{ContactRecord, Employee, GraphStore, InMemoryGraphStore};
//!
//! let mut store = InMemoryGraphStore::new();
//! store
//!     .load_employees(&[
//!         Employee::new(1, "Ada", "A", true),
//!         Employee::new(2, "Bob", "B", true),
//!         Employee::new(3, "Cy", "C", false),
//!     ])
//!     .unwrap();
//! store
//!     .load_contacts(&[ContactRecord::new(1, 2, 5), ContactRecord::new(2, 3, 8)])
//!     .unwrap();
//!
//! let config = OrchestratorConfig {
//!     rng_seed: Some(12345),
//!     ..OrchestratorConfig::new(10)
//! };
//! let mut orchestrator = Orchestrator::new(config, store).unwrap();
//! let report = orchestrator.run().unwrap();
//!
//! assert_eq!(report.incubation, 5);
//! assert_eq!(report.result.total_infected, 2);
//! ```

use super::checkpoint::{validate_snapshot, GraphSnapshot};
use crate::aggregate::aggregate;
use crate::calibration::{calibrate, Calibration, CalibrationError};
use crate::dedup::remove_duplicate_infections;
use crate::models::{Day, OutbreakResult};
use crate::propagation::{propagate, PropagationConfig, PropagationOutcome, MINIMAL_INCUBATION};
use crate::rng::{RandomSource, RngManager};
use crate::seeding::{create_index_case, seed_day, IndexCase, SeedError};
use crate::store::{GraphStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

fn default_minimal_incubation() -> Day {
    MINIMAL_INCUBATION
}

/// Complete run configuration
///
/// Deserializes from JSON; only `investigation_day` is required.
///
/// ```rust
/// use outbreak_simulator_core_rs::orchestrator::OrchestratorConfig;
///
/// let config: OrchestratorConfig =
///     serde_json::from_str(r#"{ "investigation_day": 12, "random_factor": 1 }"#).unwrap();
/// assert_eq!(config.minimal_incubation, 2);
/// assert_eq!(config.rng_seed, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Day the infection snapshot was taken
    pub investigation_day: Day,

    /// Half-width of the per-generation branching cap jitter (0 = none)
    #[serde(default)]
    pub random_factor: u32,

    /// Seed for the jitter source; `None` seeds from process entropy
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Earliest plausible infection-to-transmission gap in days
    #[serde(default = "default_minimal_incubation")]
    pub minimal_incubation: Day,
}

impl OrchestratorConfig {
    /// Configuration with no jitter, no seed and the default minimal incubation
    pub fn new(investigation_day: Day) -> Self {
        Self {
            investigation_day,
            random_factor: 0,
            rng_seed: None,
            minimal_incubation: MINIMAL_INCUBATION,
        }
    }

    pub fn propagation_config(&self) -> PropagationConfig {
        PropagationConfig {
            investigation_day: self.investigation_day,
            random_factor: self.random_factor,
            minimal_incubation: self.minimal_incubation,
        }
    }
}

// ============================================================================
// Results & Errors
// ============================================================================

/// Everything a run produced for one store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Store realization the run used
    pub backend: String,

    /// Calibrated baseline branching cap
    pub r: i64,

    /// Calibrated incubation period
    pub incubation: Day,

    pub index_case: IndexCase,

    pub propagation: PropagationOutcome,

    /// Infection edges removed by deduplication
    pub duplicates_removed: usize,

    pub result: OutbreakResult,
}

/// Simulation error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Calibration failed: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Seeding failed: {0}")]
    Seeding(#[from] SeedError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Simulation invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshots come from different configurations ({left} vs {right})")]
    ConfigMismatch { left: String, right: String },

    #[error("Orchestrator already ran against this store")]
    AlreadyRun,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives a full run against a [`GraphStore`]
///
/// Generic over the store and the jitter source so tests can inject both.
pub struct Orchestrator<S: GraphStore, R: RandomSource = RngManager> {
    config: OrchestratorConfig,
    store: S,
    rng: R,
    completed: bool,
}

impl<S: GraphStore> Orchestrator<S, RngManager> {
    /// Create an orchestrator whose jitter source follows `config.rng_seed`
    pub fn new(config: OrchestratorConfig, store: S) -> Result<Self, SimulationError> {
        let rng = match config.rng_seed {
            Some(seed) => RngManager::new(seed),
            None => RngManager::from_entropy(),
        };
        Self::with_rng(config, store, rng)
    }
}

impl<S: GraphStore, R: RandomSource> Orchestrator<S, R> {
    /// Create an orchestrator with an injected jitter source
    ///
    /// `config.rng_seed` is ignored.
    pub fn with_rng(config: OrchestratorConfig, store: S, rng: R) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            store,
            rng,
            completed: false,
        })
    }

    fn validate_config(config: &OrchestratorConfig) -> Result<(), SimulationError> {
        if config.minimal_incubation < 0 {
            return Err(SimulationError::InvalidConfig(format!(
                "minimal_incubation must be >= 0, got {}",
                config.minimal_incubation
            )));
        }
        Ok(())
    }

    /// Calibrate R and incubation without mutating the store
    pub fn calibrate(&self) -> Result<Calibration, SimulationError> {
        calibrate(&self.store, self.config.investigation_day)
    }

    /// Execute the whole pipeline once
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        if self.completed {
            return Err(SimulationError::AlreadyRun);
        }

        let Calibration { r, incubation } = self.calibrate()?;
        tracing::info!(
            backend = self.store.backend_name(),
            r,
            incubation,
            "calibration finished"
        );

        let day = seed_day(
            self.config.investigation_day,
            incubation,
            self.config.minimal_incubation,
        );
        let index_case = create_index_case(&mut self.store, day)?;
        self.completed = true;

        let propagation = propagate(
            &mut self.store,
            &mut self.rng,
            &self.config.propagation_config(),
            r,
        )?;

        let duplicates_removed = remove_duplicate_infections(&mut self.store)?;

        let snapshot = GraphSnapshot::capture(&self.store, &self.config)?;
        validate_snapshot(&snapshot, index_case.id)?;

        let result = aggregate(&self.store)?;
        tracing::info!(backend = self.store.backend_name(), %result, "simulation finished");

        Ok(SimulationReport {
            backend: self.store.backend_name().to_string(),
            r,
            incubation,
            index_case,
            propagation,
            duplicates_removed,
            result,
        })
    }

    /// Capture the current graph state
    pub fn snapshot(&self) -> Result<GraphSnapshot, SimulationError> {
        GraphSnapshot::capture(&self.store, &self.config)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
