//! Background tasks.
//!
//! Detached work is spawned onto the shared [`tokio_util::task::TaskTracker`]
//! in [`crate::state::AppState`] so graceful shutdown can wait for it.

pub mod batch_runner;
