//! Run inputs after parsing and path resolution.

use crate::{Error, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Release feed queried when no other endpoint is configured.
pub const DEFAULT_CATALOG_URL: &str = "https://api.github.com/repos/kobaltcore/renkit/releases";

/// Literal alias selecting the newest runtime version.
pub const LATEST: &str = "latest";

/// Requested runtime dependency version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeVersionRequest {
    /// Resolve the newest available version at run time
    Latest,
    /// Use this version verbatim
    Exact(String),
}

impl RuntimeVersionRequest {
    /// Parse a requested version. Only the exact token `latest` is an alias.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw == LATEST {
            return Ok(Self::Latest);
        }
        if raw.trim().is_empty() {
            return Err(Error::configuration("runtime version must not be empty"));
        }
        Ok(Self::Exact(raw.to_string()))
    }
}

impl fmt::Display for RuntimeVersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Exact(version) => f.write_str(version),
        }
    }
}

/// Everything one rigup run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInputs {
    /// Requested runtime version (may be `latest`)
    pub runtime_version: RuntimeVersionRequest,
    /// Requested toolchain release tag
    pub toolchain_version: String,
    /// Build configuration file
    pub build_config: PathBuf,
    /// Release feed endpoint
    pub catalog_url: String,
    /// Directory holding extracted toolchain releases, one per tag
    pub toolchain_dir: PathBuf,
    /// Directory holding the installed runtime (the cached payload)
    pub cache_dir: PathBuf,
    /// Project directory handed to the build tool
    pub input_dir: PathBuf,
    /// Directory the build tool writes artifacts into
    pub output_dir: PathBuf,
    /// JVM home passed to toolchain commands
    pub runtime_home: Option<PathBuf>,
    /// Tool used to list and install runtime versions
    pub version_tool: String,
    /// Tool used to build
    pub build_tool: String,
}

impl RunInputs {
    /// Make every path absolute relative to `cwd`.
    #[must_use]
    pub fn resolve(mut self, cwd: &Path) -> Self {
        self.build_config = absolutize(cwd, &self.build_config);
        self.toolchain_dir = absolutize(cwd, &self.toolchain_dir);
        self.cache_dir = absolutize(cwd, &self.cache_dir);
        self.input_dir = absolutize(cwd, &self.input_dir);
        self.output_dir = absolutize(cwd, &self.output_dir);
        self.runtime_home = self.runtime_home.map(|p| absolutize(cwd, &p));
        self
    }
}

/// Join `path` onto `base` unless it is already absolute, then fold `.` and
/// `..` components lexically. `..` never climbs above the root.
#[must_use]
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(Component::ParentDir),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs() -> RunInputs {
        RunInputs {
            runtime_version: RuntimeVersionRequest::Latest,
            toolchain_version: "v4.0.0".into(),
            build_config: "renconstruct.toml".into(),
            catalog_url: DEFAULT_CATALOG_URL.into(),
            toolchain_dir: "../renkit".into(),
            cache_dir: "../cache-renpy".into(),
            input_dir: ".".into(),
            output_dir: "/abs/out".into(),
            runtime_home: Some("jdk".into()),
            version_tool: "renutil".into(),
            build_tool: "renconstruct".into(),
        }
    }

    #[test]
    fn test_parse_latest() {
        assert_eq!(
            RuntimeVersionRequest::parse("latest").unwrap(),
            RuntimeVersionRequest::Latest
        );
    }

    #[test]
    fn test_parse_exact_is_verbatim() {
        assert_eq!(
            RuntimeVersionRequest::parse("7.5.3").unwrap(),
            RuntimeVersionRequest::Exact("7.5.3".into())
        );
        // Only the exact token is an alias
        assert_eq!(
            RuntimeVersionRequest::parse("Latest").unwrap(),
            RuntimeVersionRequest::Exact("Latest".into())
        );
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert!(RuntimeVersionRequest::parse("").is_err());
        assert!(RuntimeVersionRequest::parse("   ").is_err());
    }

    #[test]
    fn test_request_display() {
        assert_eq!(RuntimeVersionRequest::Latest.to_string(), "latest");
        assert_eq!(
            RuntimeVersionRequest::Exact("8.1.0".into()).to_string(),
            "8.1.0"
        );
    }

    #[test]
    fn test_resolve_paths() {
        let inputs = sample_inputs().resolve(Path::new("/work/game"));

        assert_eq!(inputs.build_config, PathBuf::from("/work/game/renconstruct.toml"));
        assert_eq!(inputs.toolchain_dir, PathBuf::from("/work/renkit"));
        assert_eq!(inputs.cache_dir, PathBuf::from("/work/cache-renpy"));
        assert_eq!(inputs.input_dir, PathBuf::from("/work/game"));
        assert_eq!(inputs.output_dir, PathBuf::from("/abs/out"));
        assert_eq!(inputs.runtime_home, Some(PathBuf::from("/work/game/jdk")));
    }

    #[test]
    fn test_absolutize_folds_parent_components() {
        let base = Path::new("/work/game");

        assert_eq!(absolutize(base, Path::new("..")), PathBuf::from("/work"));
        assert_eq!(
            absolutize(base, Path::new("./a/../../b")),
            PathBuf::from("/work/b")
        );
        assert_eq!(absolutize(base, Path::new("/x/../../y")), PathBuf::from("/y"));
        assert_eq!(absolutize(Path::new(""), Path::new("../z")), PathBuf::from("../z"));
    }
}
