//! Employee (graph node) model
//!
//! Each employee carries an infection flag and, once infected, the generation
//! (`iteration`) in which the simulation attributes the infection.
//!
//! - `iteration == None` for never-infected employees
//! - `iteration == Some(0)` only for the synthetic index case
//! - `iteration == Some(1)` for employees already infected when the run is seeded

use serde::{Deserialize, Serialize};

/// Unique non-negative employee identifier
pub type EmployeeId = u32;

/// Contact or transmission day (may be negative after calibration offsets)
pub type Day = i32;

/// Employee node of the workplace contact graph
///
/// # Example
/// ```
/// use outbreak_simulator_core_rs::Employee;
///
/// let mut employee = Employee::new(7, "Ada", "Lovelace", false);
/// assert!(!employee.is_infected());
/// assert_eq!(employee.iteration(), None);
///
/// employee.mark_infected(3);
/// assert!(employee.is_infected());
/// assert_eq!(employee.iteration(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    id: EmployeeId,
    first_name: String,
    last_name: String,
    is_infected: bool,
    iteration: Option<u32>,
}

impl Employee {
    /// Create an employee as the loader sees it (no generation assigned yet)
    pub fn new(
        id: EmployeeId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        is_infected: bool,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            is_infected,
            iteration: None,
        }
    }

    /// Synthetic "Patient Zero" rooting the generation model
    pub fn index_case(id: EmployeeId) -> Self {
        Self {
            id,
            first_name: "Patient".to_string(),
            last_name: "Zero".to_string(),
            is_infected: true,
            iteration: Some(0),
        }
    }

    /// Rebuild an employee with a stored generation
    ///
    /// Used by store implementations reading back persisted rows.
    pub fn with_iteration(mut self, iteration: Option<u32>) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn is_infected(&self) -> bool {
        self.is_infected
    }

    pub fn iteration(&self) -> Option<u32> {
        self.iteration
    }

    /// Mark infected and assign the generation of the infection
    pub fn mark_infected(&mut self, iteration: u32) {
        self.is_infected = true;
        self.iteration = Some(iteration);
    }
}
