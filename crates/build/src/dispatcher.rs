//! Build tool invocation.

use crate::artifacts::BuildArtifactSet;
use rigup_core::{BuildInvocation, CommandRunner, Error, Result, Toolchain};
use tracing::{info, warn};

/// Runs the build tool and collects what it produced.
pub struct BuildDispatcher<'a> {
    toolchain: &'a Toolchain,
    runner: &'a dyn CommandRunner,
}

impl<'a> BuildDispatcher<'a> {
    /// Create a dispatcher for `toolchain`.
    pub fn new(toolchain: &'a Toolchain, runner: &'a dyn CommandRunner) -> Self {
        Self { toolchain, runner }
    }

    /// Run the build and enumerate `<output_dir>/*`.
    ///
    /// Artifacts are only enumerated after the build tool exits with status
    /// zero.
    pub async fn dispatch(&self, invocation: &BuildInvocation) -> Result<BuildArtifactSet> {
        let spec = self.toolchain.build(invocation);
        info!(
            version = %invocation.version,
            config = %invocation.config.display(),
            output = %invocation.output_dir.display(),
            "Starting build"
        );

        let output = self.runner.run(&spec).await.map_err(|e| {
            Error::build_failed_with(format!("could not start build tool: {e}"))
        })?;
        if !output.success() {
            return Err(Error::build_failed(output.exit_code));
        }

        let artifacts = BuildArtifactSet::discover(&invocation.output_dir)?;
        if artifacts.is_empty() {
            warn!(output = %invocation.output_dir.display(), "Build produced no artifacts");
        } else {
            info!(count = artifacts.len(), "Build finished");
        }
        Ok(artifacts)
    }
}
