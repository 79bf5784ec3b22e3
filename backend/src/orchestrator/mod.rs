//! Orchestrator - runs the outbreak pipeline against a store
//!
//! See `engine.rs` for the pipeline and `checkpoint.rs` for snapshots.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{Orchestrator, OrchestratorConfig, SimulationError, SimulationReport};

// Re-export checkpoint types
pub use checkpoint::{GraphSnapshot, InfectionSnapshot};
