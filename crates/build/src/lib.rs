//! Runtime version resolution and build dispatch for rigup.

#![warn(missing_docs)]

mod artifacts;
mod dispatcher;
mod runtime;

pub use artifacts::BuildArtifactSet;
pub use dispatcher::BuildDispatcher;
pub use runtime::resolve_runtime_version;
