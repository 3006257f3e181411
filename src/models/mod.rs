//! Domain models for the employee dataset

pub mod employee;
pub mod types;

// Re-export commonly used types
pub use employee::{Employee, RawRecord};
pub use types::{AgeBucket, Location};
