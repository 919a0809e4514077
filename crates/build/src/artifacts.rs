//! Build artifact discovery.

use rigup_core::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Paths found directly under a build's output directory, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildArtifactSet {
    output_dir: PathBuf,
    paths: Vec<PathBuf>,
}

impl BuildArtifactSet {
    /// Enumerate `<output_dir>/*`.
    ///
    /// A missing output directory yields an empty set.
    pub fn discover(output_dir: &Path) -> Result<Self> {
        let pattern = glob::Pattern::escape(&output_dir.to_string_lossy());
        let pattern = Path::new(&pattern).join("*");
        let pattern = pattern.to_string_lossy();

        let mut paths = Vec::new();
        for entry in glob::glob(&pattern)
            .map_err(|e| Error::configuration(format!("invalid output pattern: {e}")))?
        {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                Error::io(e.into_error(), path, "read")
            })?;
            paths.push(path);
        }
        paths.sort();

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            paths,
        })
    }

    /// Output directory the artifacts were collected from.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Artifact paths in order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the build produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
