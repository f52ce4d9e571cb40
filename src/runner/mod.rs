//! Forwarding of contract content to an external execution engine.

mod output;
mod runner;

pub use output::configure_colors;
pub use runner::{ContractRunner, DEFAULT_EXECUTOR, RunError};
