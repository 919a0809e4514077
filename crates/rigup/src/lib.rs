//! rigup: provision a release toolchain, cache its runtime dependency and run
//! a build, as a CI step.
//!
//! The binary wires real collaborators into an [`Orchestrator`]; tests and
//! embedders can inject their own release source, installer, cache and
//! command runner.

#![warn(missing_docs)]

pub mod cli;
pub mod orchestrator;
pub mod outputs;
pub mod tracing;

pub use orchestrator::{Orchestrator, RunOutcome};
pub use outputs::RunOutputs;
