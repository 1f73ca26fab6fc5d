//! Batch job orchestration over a [`JobBackend`](genbatch_inference::backend::JobBackend)
//! and a [`RecordStore`](genbatch_records::store::RecordStore).
//!
//! A batch reads its inputs from one record, submits N jobs concurrently,
//! polls them in bounded groups, aggregates their outcomes, and writes the
//! summary back to the record once.

pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod scheduler;
pub mod submitter;
pub mod writeback;
