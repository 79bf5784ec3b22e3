//! Shared fixtures for integration tests
//!
//! Every scenario is built through the `GraphStore` trait; tests write their
//! checks generically and call them once per store realization.

#![allow(dead_code)]

use outbreak_simulator_core_rs::{
    ContactRecord, Day, Employee, EmployeeId, GraphStore, InMemoryGraphStore, RandomSource,
    SqliteGraphStore,
};

/// Load employees `(id, infected)` and contacts `(a, b, day)` into `store`
pub fn build<S: GraphStore>(
    mut store: S,
    employees: &[(EmployeeId, bool)],
    contacts: &[(EmployeeId, EmployeeId, Day)],
) -> S {
    let employees: Vec<Employee> = employees
        .iter()
        .map(|&(id, infected)| {
            Employee::new(id, format!("First{}", id), format!("Last{}", id), infected)
        })
        .collect();
    store.load_employees(&employees).unwrap();

    let contacts: Vec<ContactRecord> = contacts
        .iter()
        .map(|&(a, b, day)| ContactRecord::new(a, b, day))
        .collect();
    store.load_contacts(&contacts).unwrap();
    store
}

pub fn memory(
    employees: &[(EmployeeId, bool)],
    contacts: &[(EmployeeId, EmployeeId, Day)],
) -> InMemoryGraphStore {
    build(InMemoryGraphStore::new(), employees, contacts)
}

pub fn sqlite(
    employees: &[(EmployeeId, bool)],
    contacts: &[(EmployeeId, EmployeeId, Day)],
) -> SqliteGraphStore {
    build(SqliteGraphStore::open_in_memory().unwrap(), employees, contacts)
}

/// Random source replaying a fixed script and counting draws
pub struct ScriptedRng {
    values: Vec<i64>,
    pub draws: usize,
}

impl ScriptedRng {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values, draws: 0 }
    }
}

impl RandomSource for ScriptedRng {
    fn range(&mut self, min: i64, max: i64) -> i64 {
        let value = self.values[self.draws % self.values.len()];
        self.draws += 1;
        assert!(
            min <= value && value < max,
            "scripted value {} outside [{}, {})",
            value,
            min,
            max
        );
        value
    }
}
