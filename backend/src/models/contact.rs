//! Contact records
//!
//! A contact is an unordered pair of employees that met on a given day.
//! Several contacts may link the same pair on different (or equal) days;
//! traversal is always bidirectional.

use crate::models::employee::{Day, EmployeeId};
use serde::{Deserialize, Serialize};

/// One undirected contact edge `(employee_a, employee_b, day)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactRecord {
    pub employee_a: EmployeeId,
    pub employee_b: EmployeeId,
    pub day: Day,
}

impl ContactRecord {
    pub fn new(employee_a: EmployeeId, employee_b: EmployeeId, day: Day) -> Self {
        Self {
            employee_a,
            employee_b,
            day,
        }
    }

    /// The endpoint opposite `id`, if `id` is an endpoint at all
    pub fn other(&self, id: EmployeeId) -> Option<EmployeeId> {
        if self.employee_a == id {
            Some(self.employee_b)
        } else if self.employee_b == id {
            Some(self.employee_a)
        } else {
            None
        }
    }

    pub fn is_self_contact(&self) -> bool {
        self.employee_a == self.employee_b
    }
}
