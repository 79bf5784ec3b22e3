//! Domain models for the outbreak simulator

pub mod contact;
pub mod employee;
pub mod infection;
pub mod result;

// Re-exports
pub use contact::ContactRecord;
pub use employee::{Day, Employee, EmployeeId};
pub use infection::{EdgeId, InfectionEdge};
pub use result::OutbreakResult;
