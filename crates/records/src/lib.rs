//! Record-store collaborator: reads the inputs of a batch and receives its
//! aggregated outcome.
//!
//! [`store::RecordStore`] is the keyed field-map contract the orchestrator
//! depends on. [`airtable::AirtableClient`] implements it over REST and
//! [`memory::MemoryRecordStore`] keeps records in process.

pub mod airtable;
pub mod fields;
pub mod memory;
pub mod store;
