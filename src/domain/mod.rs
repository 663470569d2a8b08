//! Domain model: employers, the jobs they offer, and geo helpers.
//!
//! Wire format is flat camelCase JSON, matching what the browser UI sends.

pub mod employer;
pub mod geo;
pub mod job;

pub use employer::{Employer, EmployerInput};
pub use geo::distance_miles;
pub use job::{Commute, Job, JobInput, JobStatus};
