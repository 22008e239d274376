//! Shared building blocks for the pipeform workspace.
//!
//! Holds the cross-crate error type, environment/.env handling, the runtime
//! settings read from the environment, and the tracing bootstrap.

pub mod env;
pub mod error;
pub mod logging;
pub mod settings;
