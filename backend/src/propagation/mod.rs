//! Propagation Engine
//!
//! Two-phase, generation-bounded forward simulation of the outbreak.
//!
//! # Algorithm
//!
//! ```text
//! Phase 1 (bound pass):  day bound = investigation_day − minimal_incubation
//!     g = 0
//!     repeat: g += 1; new = step(g) until new == 0
//! Phase 2 (replay pass): day bound = investigation_day
//!     for i in 1..=g: step(i)
//! ```
//!
//! Each step reads a snapshot of the graph, computes every source's targets,
//! and only then writes infections and edges. The generation counter is a
//! value threaded through the calls, never shared state.

mod engine;
mod jitter;

pub use engine::{
    generation_step, propagate, PropagationConfig, PropagationOutcome, StepOutcome,
    MINIMAL_INCUBATION,
};
pub use jitter::randomize;
