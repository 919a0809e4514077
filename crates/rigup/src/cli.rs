//! Command-line interface, input validation and error reporting.

use crate::tracing::{LogLevel, TracingFormat};
use clap::Parser;
use miette::{Diagnostic, Report};
use rigup_core::inputs::DEFAULT_CATALOG_URL;
use rigup_core::toolchain::{DEFAULT_BUILD_TOOL, DEFAULT_VERSION_TOOL};
use rigup_core::{RunInputs, RuntimeVersionRequest};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// A stage of the run failed
pub const EXIT_FAILURE: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("Configuration error: {message}")]
    #[diagnostic(code(rigup::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// A run stage failed (exit code 1)
    #[error("{message}")]
    #[diagnostic(code(rigup::cli::failed))]
    Failed {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new stage failure
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            help: None,
        }
    }
}

/// Convert `rigup_core::Error` to the matching `CliError` variant, keeping
/// the diagnostic help text.
impl From<rigup_core::Error> for CliError {
    fn from(err: rigup_core::Error) -> Self {
        let help = err.help().map(|h| h.to_string());
        match err {
            // Extract just the message to avoid "Configuration error: Configuration error:"
            rigup_core::Error::Configuration { message } => Self::Config { message, help },
            err if err.is_configuration() => Self::Config {
                message: err.to_string(),
                help,
            },
            err => Self::Failed {
                message: err.to_string(),
                help,
            },
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Failed { .. } => EXIT_FAILURE,
    }
}

/// Render an error through miette on stderr
#[allow(clippy::print_stderr)]
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    let _ = io::stderr().flush();
}

/// Provision a release toolchain, cache its runtime dependency and run a build.
///
/// Every option can also be supplied through the environment, including the
/// `INPUT_*` variables GitHub Actions sets for action inputs.
#[derive(Parser, Debug)]
#[command(name = "rigup")]
#[command(version)]
pub struct Cli {
    /// Runtime version to build with, or `latest`.
    #[arg(long, env = "INPUT_RUNTIME-VERSION")]
    pub runtime_version: String,

    /// Toolchain release tag. Unknown tags fall back to the newest release.
    #[arg(long, env = "INPUT_TOOLCHAIN-VERSION")]
    pub toolchain_version: String,

    /// Build configuration file handed to the build tool.
    #[arg(long, env = "INPUT_BUILD-CONFIG")]
    pub build_config: PathBuf,

    /// Release feed endpoint.
    #[arg(long, env = "RIGUP_CATALOG_URL", default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,

    /// Directory holding extracted toolchain releases, one subdirectory per tag.
    #[arg(long, env = "RIGUP_TOOLCHAIN_DIR", default_value = "../renkit")]
    pub toolchain_dir: PathBuf,

    /// Directory holding the installed runtime.
    #[arg(long, env = "RIGUP_CACHE_DIR", default_value = "../cache-renpy")]
    pub cache_dir: PathBuf,

    /// Directory storing cache entries. Defaults to the platform cache dir.
    #[arg(long, env = "RIGUP_CACHE_STORE")]
    pub cache_store: Option<PathBuf>,

    /// Project directory to build.
    #[arg(long, env = "RIGUP_INPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Directory receiving the build artifacts.
    #[arg(long, env = "RIGUP_OUTPUT_DIR", default_value = "../out-renconstruct")]
    pub output_dir: PathBuf,

    /// JVM home passed to toolchain commands as `JAVA_HOME`.
    #[arg(long, env = "JAVA_HOME_8_X64")]
    pub runtime_home: Option<PathBuf>,

    /// Toolchain executable that lists and installs runtime versions.
    #[arg(long, env = "RIGUP_VERSION_TOOL", default_value = DEFAULT_VERSION_TOOL)]
    pub version_tool: String,

    /// Toolchain executable that runs the build.
    #[arg(long, env = "RIGUP_BUILD_TOOL", default_value = DEFAULT_BUILD_TOOL)]
    pub build_tool: String,

    /// Logging verbosity level.
    #[arg(long, env = "RIGUP_LOG", default_value = "info", value_enum)]
    pub log_level: LogLevel,

    /// Log output format.
    #[arg(long, env = "RIGUP_LOG_FORMAT", default_value = "pretty", value_enum)]
    pub log_format: TracingFormat,
}

impl Cli {
    /// Validate the arguments and resolve every path against `cwd`.
    pub fn to_inputs(&self, cwd: &Path) -> Result<RunInputs, CliError> {
        let runtime_version = RuntimeVersionRequest::parse(&self.runtime_version)?;
        if self.toolchain_version.trim().is_empty() {
            return Err(CliError::config("toolchain version must not be empty"));
        }

        Ok(RunInputs {
            runtime_version,
            toolchain_version: self.toolchain_version.clone(),
            build_config: self.build_config.clone(),
            catalog_url: self.catalog_url.clone(),
            toolchain_dir: self.toolchain_dir.clone(),
            cache_dir: self.cache_dir.clone(),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            runtime_home: self.runtime_home.clone(),
            version_tool: self.version_tool.clone(),
            build_tool: self.build_tool.clone(),
        }
        .resolve(cwd))
    }
}
