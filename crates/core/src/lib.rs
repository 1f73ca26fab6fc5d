//! Domain types and pure batch logic for the generation orchestrator.
//!
//! Nothing in this crate performs I/O. The pipeline crate drives the
//! remote calls and feeds their results through the functions here.

pub mod aggregate;
pub mod batch;
pub mod error;
pub mod job;
pub mod limits;
pub mod polling;
pub mod types;
