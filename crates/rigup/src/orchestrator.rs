//! End-to-end run sequencing.
//!
//! Stages run strictly in order and the first error aborts the run:
//!
//! 1. check the build config exists
//! 2. fetch the release catalog
//! 3. resolve the toolchain release and install the asset for this host
//! 4. resolve the runtime version
//! 5. restore or install the runtime through the cache
//! 6. run the build and collect its artifacts
//!
//! Nothing downloaded or cached is cleaned up afterwards.

use rigup_build::{BuildArtifactSet, BuildDispatcher, resolve_runtime_version};
use rigup_cache::{CacheManager, CacheOutcome, DirectoryCache};
use rigup_catalog::{ReleaseSource, ToolchainInstaller, resolve_toolchain, select_asset};
use rigup_core::{BuildInvocation, CommandRunner, Error, Platform, Result, RunInputs, Toolchain};
use tracing::info;

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Release tag of the installed toolchain
    pub toolchain_tag: String,
    /// True when the requested tag was unknown and the newest release was used
    pub toolchain_fell_back: bool,
    /// Concrete runtime version the build ran with
    pub runtime_version: String,
    /// How the runtime dependency was provisioned
    pub cache: CacheOutcome,
    /// Everything the build wrote into the output directory
    pub artifacts: BuildArtifactSet,
}

/// Drives one run over injected collaborators.
pub struct Orchestrator<'a> {
    source: &'a dyn ReleaseSource,
    installer: &'a dyn ToolchainInstaller,
    cache: &'a dyn DirectoryCache,
    runner: &'a dyn CommandRunner,
    platform: Option<Platform>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator targeting the current host.
    pub fn new(
        source: &'a dyn ReleaseSource,
        installer: &'a dyn ToolchainInstaller,
        cache: &'a dyn DirectoryCache,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            source,
            installer,
            cache,
            runner,
            platform: Platform::current(),
        }
    }

    /// Select toolchain assets for `platform` instead of the host.
    #[must_use]
    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    /// Execute every stage for `inputs`.
    pub async fn run(&self, inputs: &RunInputs) -> Result<RunOutcome> {
        if !inputs.build_config.exists() {
            return Err(Error::config_not_found(&inputs.build_config));
        }

        let catalog = self.source.fetch().await?;
        info!(source = catalog.source(), releases = catalog.len(), "Fetched release catalog");

        let resolved = resolve_toolchain(&catalog, &inputs.toolchain_version);
        let release = resolved.release;
        let asset = select_asset(release, self.platform)?;
        info!(tag = %release.tag_name, asset = %asset.name, "Selected toolchain");

        let installed = self
            .installer
            .install(release, asset, &inputs.toolchain_dir)
            .await?;

        let mut toolchain = Toolchain::new(&installed.dir)
            .with_version_tool(&inputs.version_tool)
            .with_build_tool(&inputs.build_tool);
        if let Some(home) = &inputs.runtime_home {
            toolchain = toolchain.with_runtime_home(home);
        }

        let runtime_version =
            resolve_runtime_version(&inputs.runtime_version, &toolchain, self.runner).await?;

        let cache = CacheManager::new(self.cache, self.runner)
            .ensure_runtime(&toolchain, &runtime_version, &inputs.cache_dir)
            .await?;

        let invocation = BuildInvocation {
            runtime_dir: cache.dir.clone(),
            version: runtime_version.clone(),
            config: inputs.build_config.clone(),
            input_dir: inputs.input_dir.clone(),
            output_dir: inputs.output_dir.clone(),
        };
        let artifacts = BuildDispatcher::new(&toolchain, self.runner)
            .dispatch(&invocation)
            .await?;

        Ok(RunOutcome {
            toolchain_tag: installed.tag,
            toolchain_fell_back: resolved.fell_back,
            runtime_version,
            cache,
            artifacts,
        })
    }
}
