//! Outbreak Simulator Core - Rust Engine
//!
//! Estimates how an observed, partially labeled infection snapshot on a
//! workplace contact graph could have spread, and projects it forward.
//!
//! # Architecture
//!
//! - **store**: Graph store capability with in-memory and SQLite realizations
//! - **calibration**: Baseline R and incubation from labeled infections
//! - **seeding**: Synthetic index case rooting the generation model
//! - **propagation**: Two-phase generation-bounded spread simulation
//! - **dedup**: One parent per infected employee
//! - **aggregate**: Total infected, depth and per-generation R
//! - **orchestrator**: Runs the pipeline, snapshots and validates state
//! - **rng**: Deterministic, injectable random number generation
//!
//! # Critical Invariants
//!
//! 1. `target.iteration == source.iteration + 1` for every infection edge
//! 2. After deduplication every infected employee but the index case has one parent
//! 3. All randomness is injectable and seedable
//! 4. Results do not depend on which store realizes the graph

// Module declarations
pub mod aggregate;
pub mod calibration;
pub mod dedup;
pub mod models;
pub mod orchestrator;
pub mod propagation;
pub mod rng;
pub mod seeding;
pub mod store;

// Re-exports for convenience
pub use calibration::{Calibration, CalibrationError};
pub use models::{ContactRecord, Day, EdgeId, Employee, EmployeeId, InfectionEdge, OutbreakResult};
pub use orchestrator::{
    GraphSnapshot, Orchestrator, OrchestratorConfig, SimulationError, SimulationReport,
};
pub use propagation::{PropagationConfig, PropagationOutcome, StepOutcome, MINIMAL_INCUBATION};
pub use rng::{RandomSource, RngManager};
pub use seeding::{IndexCase, SeedError};
pub use store::{GraphStore, InMemoryGraphStore, StoreError, StoreResult};

#[cfg(feature = "sqlite")]
pub use store::SqliteGraphStore;
