//! Command shapes for an installed toolchain.
//!
//! A toolchain is a directory of executables. One tool (the version tool)
//! lists and installs runtime versions; another (the build tool) builds. All
//! invocations carry their environment explicitly so nothing leaks into the
//! rigup process itself.

use crate::command::{CommandSpec, executable_in};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default tool used to list and install runtime versions.
pub const DEFAULT_VERSION_TOOL: &str = "renutil";

/// Default tool used to build.
pub const DEFAULT_BUILD_TOOL: &str = "renconstruct";

/// Environment variable that selects the runtime's JVM.
pub const RUNTIME_HOME_VAR: &str = "JAVA_HOME";

/// An installed toolchain and the commands it offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    bin_dir: PathBuf,
    version_tool: String,
    build_tool: String,
    env: BTreeMap<String, String>,
}

/// Parameters of one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    /// Directory holding the installed runtime dependency
    pub runtime_dir: PathBuf,
    /// Concrete runtime version
    pub version: String,
    /// Build configuration file
    pub config: PathBuf,
    /// Project directory to build
    pub input_dir: PathBuf,
    /// Directory receiving the artifacts
    pub output_dir: PathBuf,
}

impl Toolchain {
    /// Create a toolchain rooted at `bin_dir` with the default tool names.
    #[must_use]
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            version_tool: DEFAULT_VERSION_TOOL.to_string(),
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            env: BTreeMap::new(),
        }
    }

    /// Override the version tool name.
    #[must_use]
    pub fn with_version_tool(mut self, name: impl Into<String>) -> Self {
        self.version_tool = name.into();
        self
    }

    /// Override the build tool name.
    #[must_use]
    pub fn with_build_tool(mut self, name: impl Into<String>) -> Self {
        self.build_tool = name.into();
        self
    }

    /// Point the runtime at a specific JVM home for every invocation.
    #[must_use]
    pub fn with_runtime_home(mut self, home: &Path) -> Self {
        self.env
            .insert(RUNTIME_HOME_VAR.to_string(), home.display().to_string());
        self
    }

    /// Directory holding the toolchain executables.
    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Environment applied to every toolchain command.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn command(&self, tool: &str) -> CommandSpec {
        let mut spec =
            CommandSpec::new(executable_in(&self.bin_dir, tool)).prepend_path(&self.bin_dir);
        for (key, value) in &self.env {
            spec = spec.env(key, value);
        }
        spec
    }

    /// List the `count` most recent runtime versions, captured from stdout.
    #[must_use]
    pub fn list_versions(&self, count: usize) -> CommandSpec {
        self.command(&self.version_tool)
            .args(["list", "-a"])
            .arg(format!("-n={count}"))
            .capture_stdout()
    }

    /// Install runtime `version` into `target`.
    #[must_use]
    pub fn install_runtime(&self, target: &Path, version: &str) -> CommandSpec {
        self.command(&self.version_tool)
            .arg("install")
            .arg(format!("-r={}", target.display()))
            .arg(format!("-v={version}"))
    }

    /// Run a build.
    #[must_use]
    pub fn build(&self, invocation: &BuildInvocation) -> CommandSpec {
        self.command(&self.build_tool)
            .arg("build")
            .arg(format!("-r={}", invocation.runtime_dir.display()))
            .arg(format!("-v={}", invocation.version))
            .arg(format!("-c={}", invocation.config.display()))
            .arg(format!("-i={}", invocation.input_dir.display()))
            .arg(format!("-o={}", invocation.output_dir.display()))
    }
}
