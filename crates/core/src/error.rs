//! Error taxonomy shared by every rigup stage.
//!
//! Every variant is terminal: the orchestrator aborts on the first error and
//! surfaces its message as the run's single failure signal.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Main error type for rigup operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The build configuration file does not exist
    #[error("Build config file not found at '{}'", path.display())]
    #[diagnostic(
        code(rigup::config::not_found),
        help("Relative paths are resolved against the working directory")
    )]
    ConfigNotFound {
        /// Path that was checked
        path: Box<Path>,
    },

    /// The release feed could not be read
    #[error("Unable to get list of toolchain releases from {url}: {message}")]
    #[diagnostic(
        code(rigup::catalog::unavailable),
        help("Set GITHUB_TOKEN to avoid anonymous API rate limits")
    )]
    CatalogUnavailable {
        /// Feed endpoint
        url: String,
        /// HTTP status code, when a response was received
        status: Option<u16>,
        /// Failure description
        message: String,
    },

    /// The release feed answered with no releases at all
    #[error("Release catalog at {url} lists no releases")]
    #[diagnostic(code(rigup::catalog::empty))]
    CatalogEmpty {
        /// Feed endpoint
        url: String,
    },

    /// No asset of the selected release targets the host
    #[error("Release {release} has no asset for platform {platform}")]
    #[diagnostic(
        code(rigup::toolchain::no_matching_asset),
        help("Supported platforms are windows, linux and macos on amd64, i386 and arm64")
    )]
    NoMatchingAsset {
        /// Release tag that was searched
        release: String,
        /// Host platform description
        platform: String,
    },

    /// Downloading or unpacking the toolchain failed
    #[error("Failed to install toolchain {release}: {message}")]
    #[diagnostic(code(rigup::toolchain::install))]
    ToolchainInstall {
        /// Release tag being installed
        release: String,
        /// Failure description
        message: String,
    },

    /// The runtime version listing command failed or printed nothing
    #[error("Unable to resolve latest runtime version: {message}")]
    #[diagnostic(code(rigup::runtime::version_list))]
    VersionListUnavailable {
        /// Failure description
        message: String,
    },

    /// Installing the runtime dependency into the cache directory failed
    #[error("Failed to install runtime {version}: {message}")]
    #[diagnostic(code(rigup::cache::install))]
    InstallFailed {
        /// Runtime version being installed
        version: String,
        /// Failure description
        message: String,
    },

    /// The build tool exited unsuccessfully
    #[error("Build failed: {message}")]
    #[diagnostic(
        code(rigup::build::failed),
        help("Check the build tool output above for details")
    )]
    BuildFailed {
        /// Exit code of the build tool, `None` when killed by a signal
        exit_code: Option<i32>,
        /// Failure description
        message: String,
    },

    /// A directory cache operation failed
    #[error("Cache operation on key '{key}' failed: {message}")]
    #[diagnostic(code(rigup::cache::store))]
    Cache {
        /// Cache key involved
        key: String,
        /// Failure description
        message: String,
    },

    /// An external process could not be started
    #[error("Failed to start '{program}'")]
    #[diagnostic(
        code(rigup::process::spawn),
        help("Ensure the toolchain was extracted and the tool name is correct")
    )]
    Process {
        /// Program that failed to start
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error with path context
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(rigup::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "create")
        operation: String,
    },

    /// Invalid input or configuration
    #[error("Configuration error: {message}")]
    #[diagnostic(code(rigup::config::invalid))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },
}

impl Error {
    /// Create a config-not-found error
    #[must_use]
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::ConfigNotFound {
            path: path.as_ref().into(),
        }
    }

    /// Create a catalog error for a non-200 response
    #[must_use]
    pub fn catalog_status(url: impl Into<String>, status: u16) -> Self {
        Self::CatalogUnavailable {
            url: url.into(),
            status: Some(status),
            message: format!("HTTP {status}"),
        }
    }

    /// Create a catalog error for a transport or decoding failure
    #[must_use]
    pub fn catalog_unavailable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            url: url.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Create an empty-catalog error
    #[must_use]
    pub fn catalog_empty(url: impl Into<String>) -> Self {
        Self::CatalogEmpty { url: url.into() }
    }

    /// Create a no-matching-asset error
    #[must_use]
    pub fn no_matching_asset(release: impl Into<String>, platform: impl Into<String>) -> Self {
        Self::NoMatchingAsset {
            release: release.into(),
            platform: platform.into(),
        }
    }

    /// Create a toolchain install error
    #[must_use]
    pub fn toolchain_install(release: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolchainInstall {
            release: release.into(),
            message: message.into(),
        }
    }

    /// Create a version-list error
    #[must_use]
    pub fn version_list_unavailable(message: impl Into<String>) -> Self {
        Self::VersionListUnavailable {
            message: message.into(),
        }
    }

    /// Create a runtime install error
    #[must_use]
    pub fn install_failed(version: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InstallFailed {
            version: version.into(),
            message: message.into(),
        }
    }

    /// Create a build failure from the build tool's exit code
    #[must_use]
    pub fn build_failed(exit_code: Option<i32>) -> Self {
        let message = exit_code.map_or_else(
            || "build tool was terminated by a signal".to_string(),
            |code| format!("build tool exited with code {code}"),
        );
        Self::BuildFailed { exit_code, message }
    }

    /// Create a build failure with a custom message
    #[must_use]
    pub fn build_failed_with(message: impl Into<String>) -> Self {
        Self::BuildFailed {
            exit_code: None,
            message: message.into(),
        }
    }

    /// Create a cache error
    #[must_use]
    pub fn cache(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a process spawn error
    #[must_use]
    pub fn process(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Process {
            program: program.into(),
            source,
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an I/O error without path context
    #[must_use]
    pub fn io_no_path(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: None,
            operation: operation.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error comes from user-supplied configuration.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigNotFound { .. } | Self::Configuration { .. })
    }
}

/// Result type for rigup operations
pub type Result<T> = std::result::Result<T, Error>;
