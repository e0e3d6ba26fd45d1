//! IDL compiler driver.
//!
//! The binary is a thin argument parser over [`commands`]; every command
//! returns its output as a string so it can be tested without a process.

pub mod commands;
mod tracing_setup;

pub use commands::CommandError;
pub use tracing_setup::init_tracing;
