//! # Input Loading and Result Output
//!
//! Thin glue between the filesystem and the core: conductor parameters from
//! JSON, route and station records from CSV, and the hourly result table
//! back out as CSV. All semantic validation happens in the domain
//! constructors, not here.

pub mod loader;
pub mod writer;

pub use loader::{load_conductor_parameters, load_observations, load_route};
pub use writer::write_records;
