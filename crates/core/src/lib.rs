//! Core types for rigup.
//!
//! - [`Error`] and [`Result`]: the error taxonomy shared by every stage
//! - [`platform`]: host OS and architecture identity
//! - [`command`]: the external process capability
//! - [`toolchain`]: command shapes offered by an installed toolchain
//! - [`inputs`]: resolved run inputs

mod error;

pub mod command;
pub mod inputs;
pub mod platform;
pub mod toolchain;

pub use command::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use error::{Error, Result};
pub use inputs::{RunInputs, RuntimeVersionRequest};
pub use platform::{Arch, Os, Platform};
pub use toolchain::{BuildInvocation, Toolchain};
