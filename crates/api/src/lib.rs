//! Generation batch webhook server library.
//!
//! Exposes the building blocks (config, state, error mapping, router,
//! handlers, background batch runner) so integration tests and the binary
//! entrypoint share them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
