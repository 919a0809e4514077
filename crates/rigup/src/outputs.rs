//! Run outputs for CI consumers.
//!
//! When `GITHUB_OUTPUT` names a file, outputs are appended to it in the
//! multiline `name<<delimiter` form. Otherwise they are printed as one JSON
//! object.

use crate::orchestrator::RunOutcome;
use rigup_core::{Error, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Environment variable naming the GitHub Actions output file.
pub const GITHUB_OUTPUT_VAR: &str = "GITHUB_OUTPUT";

/// Values published at the end of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutputs {
    /// Artifact paths in order
    pub distributions: Vec<String>,
    /// Directory the artifacts were written to
    pub distribution_dir: String,
}

impl From<&RunOutcome> for RunOutputs {
    fn from(outcome: &RunOutcome) -> Self {
        Self {
            distributions: outcome
                .artifacts
                .paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            distribution_dir: outcome.artifacts.output_dir().display().to_string(),
        }
    }
}

impl RunOutputs {
    /// Append the outputs to a GitHub Actions output file.
    pub fn append_to(&self, file: &Path) -> Result<()> {
        let distributions = serde_json::to_string(&self.distributions)
            .map_err(|e| Error::configuration(format!("failed to encode outputs: {e}")))?;

        let mut content = String::new();
        push_output(&mut content, "distributions", &distributions);
        push_output(&mut content, "distribution_dir", &self.distribution_dir);

        let mut handle = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .map_err(|e| Error::io(e, file, "open"))?;
        handle
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(e, file, "write"))
    }

    /// Write the outputs as a JSON object followed by a newline.
    pub fn write_json(&self, out: &mut impl Write) -> Result<()> {
        serde_json::to_writer(&mut *out, self)
            .map_err(|e| Error::configuration(format!("failed to encode outputs: {e}")))?;
        writeln!(out).map_err(|e| Error::io_no_path(e, "write outputs"))
    }

    /// Publish to the file named by `github_output`, or as JSON to `out`.
    pub fn emit(&self, github_output: Option<&Path>, out: &mut impl Write) -> Result<()> {
        match github_output {
            Some(file) if !file.as_os_str().is_empty() => self.append_to(file),
            _ => self.write_json(out),
        }
    }
}

fn push_output(content: &mut String, name: &str, value: &str) {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    content.push_str(name);
    content.push_str("<<");
    content.push_str(&delimiter);
    content.push('\n');
    content.push_str(value);
    content.push('\n');
    content.push_str(&delimiter);
    content.push('\n');
}
