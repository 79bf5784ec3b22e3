//! Graph store capability
//!
//! The propagation engine and its collaborators are written purely against
//! [`GraphStore`]. Two realizations ship with the crate:
//!
//! - [`memory::InMemoryGraphStore`]: arena-backed native graph
//! - [`sqlite::SqliteGraphStore`]: adapter that answers every operation with SQL
//!
//! Both must produce identical observable results for the same sequence of
//! calls. Orderings that leak into simulation outcomes are therefore fixed by
//! the contract below rather than left to the backend.

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryGraphStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteGraphStore;

use crate::models::{ContactRecord, Day, EdgeId, Employee, EmployeeId, InfectionEdge};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Errors raised by a store realization
///
/// All of them are fatal for the run; the engine never retries.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Unknown employee: {0}")]
    UnknownEmployee(EmployeeId),

    #[error("Duplicate employee id: {0}")]
    DuplicateEmployee(EmployeeId),

    #[error("Unknown infection edge: {0}")]
    UnknownEdge(EdgeId),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every day a contact can carry
pub const ALL_DAYS: RangeInclusive<Day> = Day::MIN..=Day::MAX;

/// Query/mutation primitives over employees, contacts and infection edges
///
/// # Ordering contract
///
/// - `contacts_of` yields `(neighbor, day)` sorted by neighbor id, then day,
///   never yields the queried node itself, and keeps one entry per contact
/// - `nodes_at_iteration` yields ids ascending
/// - `parent_edge_of` returns the minimal incoming edge under
///   [`InfectionEdge::retention_order`]
/// - `duplicate_infection_edges_by_target` groups each target's edges in
///   retention order
pub trait GraphStore {
    /// Short label of the realization
    fn backend_name(&self) -> &'static str;

    /// Remove every employee, contact and infection edge
    fn clear(&mut self) -> StoreResult<()>;

    /// Insert employee nodes; ids must be unique across the store
    fn load_employees(&mut self, records: &[Employee]) -> StoreResult<()>;

    /// Insert contact edges; both endpoints must already exist
    fn load_contacts(&mut self, records: &[ContactRecord]) -> StoreResult<()>;

    /// All employees sorted by id
    fn employees(&self) -> StoreResult<Vec<Employee>>;

    fn employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>>;

    fn max_employee_id(&self) -> StoreResult<Option<EmployeeId>>;

    fn infected_nodes(&self) -> StoreResult<BTreeSet<EmployeeId>>;

    /// Infected employees whose generation equals `iteration`
    fn nodes_at_iteration(&self, iteration: u32) -> StoreResult<Vec<EmployeeId>>;

    /// Neighbors reachable over a contact whose day lies in `days`
    fn contacts_of(
        &self,
        id: EmployeeId,
        days: RangeInclusive<Day>,
    ) -> StoreResult<Vec<(EmployeeId, Day)>>;

    /// `(source, day)` of the edge that infected `id`
    fn parent_edge_of(&self, id: EmployeeId) -> StoreResult<Option<(EmployeeId, Day)>>;

    fn mark_infected(&mut self, id: EmployeeId, iteration: u32) -> StoreResult<()>;

    fn create_infection_edge(
        &mut self,
        source: EmployeeId,
        target: EmployeeId,
        day: Day,
    ) -> StoreResult<EdgeId>;

    /// All infection edges ordered by edge id
    fn infection_edges(&self) -> StoreResult<Vec<InfectionEdge>>;

    /// Targets with more than one incoming edge, with those edges
    fn duplicate_infection_edges_by_target(
        &self,
    ) -> StoreResult<BTreeMap<EmployeeId, Vec<InfectionEdge>>>;

    fn delete_edges(&mut self, ids: &[EdgeId]) -> StoreResult<()>;

    fn count_distinct_infected_targets(&self) -> StoreResult<usize>;

    /// Highest generation among infected employees
    fn max_iteration(&self) -> StoreResult<Option<u32>>;

    /// Generation (≥ 1) → mean outgoing infection edges per infected employee
    fn average_out_degree_by_generation(&self) -> StoreResult<BTreeMap<u32, f64>>;
}
