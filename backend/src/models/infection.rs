//! Infection edges
//!
//! A directed `source → target` claim that `source` transmitted to `target`
//! on `day`. The edge's generation is implicit: it equals the target's
//! `iteration`.

use crate::models::employee::{Day, EmployeeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Store-assigned identifier of an infection edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub i64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Directed transmission claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfectionEdge {
    pub id: EdgeId,
    pub source: EmployeeId,
    pub target: EmployeeId,
    pub day: Day,
}

impl InfectionEdge {
    /// Retention order used by deduplication and parent lookup
    ///
    /// Earliest day first, then lowest source id, then lowest edge id.
    pub fn retention_order(&self, other: &Self) -> Ordering {
        (self.day, self.source, self.id).cmp(&(other.day, other.source, other.id))
    }
}
