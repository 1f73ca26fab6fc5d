//! Client side of the asynchronous generation service.
//!
//! Provides the [`backend::JobBackend`] capability trait the orchestrator is
//! written against, a REST wrapper over the service's submit / status
//! endpoints, typed wire messages, and one small adapter per model kind.

pub mod adapters;
pub mod api;
pub mod backend;
pub mod messages;
