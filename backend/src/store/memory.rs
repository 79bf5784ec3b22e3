//! In-memory graph store
//!
//! Employees, contacts and infection edges each live in their own arena and
//! refer to one another by integer slot, never by reference. Contact and
//! infection edges form cycles and back-links; slots keep ownership flat and
//! lookups O(1).
//!
//! # Layout
//!
//! ```text
//! nodes:      [Employee]            slot ← slots[employee id]
//! contacts:   [ContactRecord]       adjacency[node slot] → contact slots
//! infections: [Option<Edge>]        incoming/outgoing[node slot] → edge slots
//! ```
//!
//! Deleted infection edges leave a `None` tombstone so edge ids stay stable.

use super::{GraphStore, StoreError, StoreResult};
use crate::models::{ContactRecord, Day, EdgeId, Employee, EmployeeId, InfectionEdge};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::RangeInclusive;

/// Arena-backed [`GraphStore`]
///
/// # Example
///
/// ```rust
/// use outbreak_simulator_core_rs::{ContactRecord, Employee, GraphStore, InMemoryGraphStore};
///
/// let mut store = InMemoryGraphStore::new();
/// store
///     .load_employees(&[Employee::new(1, "A", "A", true), Employee::new(2, "B", "B", false)])
///     .unwrap();
/// store.load_contacts(&[ContactRecord::new(1, 2, 5)]).unwrap();
///
/// assert_eq!(store.contacts_of(2, 0..=10).unwrap(), vec![(1, 5)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    nodes: Vec<Employee>,
    slots: HashMap<EmployeeId, usize>,
    contacts: Vec<ContactRecord>,
    adjacency: Vec<Vec<usize>>,
    infections: Vec<Option<InfectionEdge>>,
    incoming: Vec<Vec<usize>>,
    outgoing: Vec<Vec<usize>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: EmployeeId) -> StoreResult<usize> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(StoreError::UnknownEmployee(id))
    }

    fn edge_slot(&self, id: EdgeId) -> StoreResult<usize> {
        id.0
            .checked_sub(1)
            .and_then(|slot| usize::try_from(slot).ok())
            .filter(|&slot| matches!(self.infections.get(slot), Some(Some(_))))
            .ok_or(StoreError::UnknownEdge(id))
    }

    fn live_edges<'a>(&'a self, slots: &'a [usize]) -> impl Iterator<Item = &'a InfectionEdge> + 'a {
        slots
            .iter()
            .filter_map(move |&slot| self.infections[slot].as_ref())
    }
}

impl GraphStore for InMemoryGraphStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn clear(&mut self) -> StoreResult<()> {
        *self = Self::default();
        Ok(())
    }

    fn load_employees(&mut self, records: &[Employee]) -> StoreResult<()> {
        // Validate the whole batch first so a rejected load leaves no partial state
        let mut batch = BTreeSet::new();
        for employee in records {
            if self.slots.contains_key(&employee.id()) || !batch.insert(employee.id()) {
                return Err(StoreError::DuplicateEmployee(employee.id()));
            }
        }

        for employee in records {
            let slot = self.nodes.len();
            self.slots.insert(employee.id(), slot);
            self.nodes.push(employee.clone());
            self.adjacency.push(Vec::new());
            self.incoming.push(Vec::new());
            self.outgoing.push(Vec::new());
        }
        Ok(())
    }

    fn load_contacts(&mut self, records: &[ContactRecord]) -> StoreResult<()> {
        let mut resolved = Vec::with_capacity(records.len());
        for contact in records {
            resolved.push((self.slot(contact.employee_a)?, self.slot(contact.employee_b)?));
        }

        for (contact, (slot_a, slot_b)) in records.iter().zip(resolved) {
            let contact_slot = self.contacts.len();
            self.contacts.push(*contact);
            self.adjacency[slot_a].push(contact_slot);
            if slot_b != slot_a {
                self.adjacency[slot_b].push(contact_slot);
            }
        }
        Ok(())
    }

    fn employees(&self) -> StoreResult<Vec<Employee>> {
        let mut employees = self.nodes.clone();
        employees.sort_by_key(Employee::id);
        Ok(employees)
    }

    fn employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        Ok(self.slots.get(&id).map(|&slot| self.nodes[slot].clone()))
    }

    fn max_employee_id(&self) -> StoreResult<Option<EmployeeId>> {
        Ok(self.slots.keys().max().copied())
    }

    fn infected_nodes(&self) -> StoreResult<BTreeSet<EmployeeId>> {
        Ok(self
            .nodes
            .iter()
            .filter(|node| node.is_infected())
            .map(Employee::id)
            .collect())
    }

    fn nodes_at_iteration(&self, iteration: u32) -> StoreResult<Vec<EmployeeId>> {
        let mut ids: Vec<EmployeeId> = self
            .nodes
            .iter()
            .filter(|node| node.is_infected() && node.iteration() == Some(iteration))
            .map(Employee::id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn contacts_of(
        &self,
        id: EmployeeId,
        days: RangeInclusive<Day>,
    ) -> StoreResult<Vec<(EmployeeId, Day)>> {
        let slot = self.slot(id)?;
        let mut neighbors: Vec<(EmployeeId, Day)> = self.adjacency[slot]
            .iter()
            .map(|&contact_slot| &self.contacts[contact_slot])
            .filter(|contact| !contact.is_self_contact() && days.contains(&contact.day))
            .filter_map(|contact| contact.other(id).map(|other| (other, contact.day)))
            .collect();
        neighbors.sort_unstable();
        Ok(neighbors)
    }

    fn parent_edge_of(&self, id: EmployeeId) -> StoreResult<Option<(EmployeeId, Day)>> {
        let slot = self.slot(id)?;
        Ok(self
            .live_edges(&self.incoming[slot])
            .min_by(|a, b| a.retention_order(b))
            .map(|edge| (edge.source, edge.day)))
    }

    fn mark_infected(&mut self, id: EmployeeId, iteration: u32) -> StoreResult<()> {
        let slot = self.slot(id)?;
        self.nodes[slot].mark_infected(iteration);
        Ok(())
    }

    fn create_infection_edge(
        &mut self,
        source: EmployeeId,
        target: EmployeeId,
        day: Day,
    ) -> StoreResult<EdgeId> {
        let source_slot = self.slot(source)?;
        let target_slot = self.slot(target)?;

        let edge_slot = self.infections.len();
        let id = EdgeId(edge_slot as i64 + 1);
        self.infections.push(Some(InfectionEdge {
            id,
            source,
            target,
            day,
        }));
        self.outgoing[source_slot].push(edge_slot);
        self.incoming[target_slot].push(edge_slot);
        Ok(id)
    }

    fn infection_edges(&self) -> StoreResult<Vec<InfectionEdge>> {
        Ok(self.infections.iter().flatten().copied().collect())
    }

    fn duplicate_infection_edges_by_target(
        &self,
    ) -> StoreResult<BTreeMap<EmployeeId, Vec<InfectionEdge>>> {
        let mut groups = BTreeMap::new();
        for (slot, node) in self.nodes.iter().enumerate() {
            let mut edges: Vec<InfectionEdge> =
                self.live_edges(&self.incoming[slot]).copied().collect();
            if edges.len() > 1 {
                edges.sort_by(|a, b| a.retention_order(b));
                groups.insert(node.id(), edges);
            }
        }
        Ok(groups)
    }

    fn delete_edges(&mut self, ids: &[EdgeId]) -> StoreResult<()> {
        let mut edge_slots = Vec::with_capacity(ids.len());
        for &id in ids {
            edge_slots.push(self.edge_slot(id)?);
        }

        for edge_slot in edge_slots {
            let Some(edge) = self.infections[edge_slot].take() else {
                continue;
            };
            let source_slot = self.slot(edge.source)?;
            let target_slot = self.slot(edge.target)?;
            self.outgoing[source_slot].retain(|&slot| slot != edge_slot);
            self.incoming[target_slot].retain(|&slot| slot != edge_slot);
        }
        Ok(())
    }

    fn count_distinct_infected_targets(&self) -> StoreResult<usize> {
        Ok(self
            .incoming
            .iter()
            .filter(|edges| !edges.is_empty())
            .count())
    }

    fn max_iteration(&self) -> StoreResult<Option<u32>> {
        Ok(self
            .nodes
            .iter()
            .filter(|node| node.is_infected())
            .filter_map(Employee::iteration)
            .max())
    }

    fn average_out_degree_by_generation(&self) -> StoreResult<BTreeMap<u32, f64>> {
        let mut totals: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
        for (slot, node) in self.nodes.iter().enumerate() {
            let Some(iteration) = node.iteration().filter(|&i| i >= 1 && node.is_infected())
            else {
                continue;
            };
            let entry = totals.entry(iteration).or_insert((0, 0));
            entry.0 += self.outgoing[slot].len();
            entry.1 += 1;
        }

        Ok(totals
            .into_iter()
            .map(|(iteration, (edges, nodes))| (iteration, edges as f64 / nodes as f64))
            .collect())
    }
}
