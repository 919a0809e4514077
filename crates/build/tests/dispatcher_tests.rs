//! Build dispatch against a fake command runner.

use async_trait::async_trait;
use rigup_build::BuildDispatcher;
use rigup_core::{
    BuildInvocation, CommandOutput, CommandRunner, CommandSpec, Error, Result, Toolchain,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Runner that writes files into the output directory before "exiting".
struct FakeBuildTool {
    exit_code: Option<i32>,
    produces: Vec<&'static str>,
    output_dir: PathBuf,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeBuildTool {
    fn new(output_dir: &Path, exit_code: Option<i32>, produces: Vec<&'static str>) -> Self {
        Self {
            exit_code,
            produces,
            output_dir: output_dir.to_path_buf(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeBuildTool {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        std::fs::create_dir_all(&self.output_dir).unwrap();
        for name in &self.produces {
            std::fs::write(self.output_dir.join(name), b"artifact").unwrap();
        }
        Ok(CommandOutput::new(self.exit_code, ""))
    }
}

fn invocation(tmp: &TempDir) -> BuildInvocation {
    BuildInvocation {
        runtime_dir: tmp.path().join("cache-renpy"),
        version: "7.5.3".into(),
        config: tmp.path().join("project/renconstruct.toml"),
        input_dir: tmp.path().join("project"),
        output_dir: tmp.path().join("out"),
    }
}

#[tokio::test]
async fn successful_build_reports_sorted_artifacts() {
    let tmp = TempDir::new().unwrap();
    let inv = invocation(&tmp);
    let runner = FakeBuildTool::new(&inv.output_dir, Some(0), vec!["game-pc.zip", "game-mac.zip"]);
    let toolchain = Toolchain::new("/opt/renkit").with_runtime_home(Path::new("/opt/jdk8"));

    let artifacts = BuildDispatcher::new(&toolchain, &runner)
        .dispatch(&inv)
        .await
        .unwrap();

    assert_eq!(
        artifacts.paths(),
        &[inv.output_dir.join("game-mac.zip"), inv.output_dir.join("game-pc.zip")]
    );

    let calls = runner.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].args,
        vec![
            "build".to_string(),
            format!("-r={}", inv.runtime_dir.display()),
            "-v=7.5.3".to_string(),
            format!("-c={}", inv.config.display()),
            format!("-i={}", inv.input_dir.display()),
            format!("-o={}", inv.output_dir.display()),
        ]
    );
    assert_eq!(
        calls[0].env.get("JAVA_HOME").map(String::as_str),
        Some("/opt/jdk8")
    );
}

#[tokio::test]
async fn failed_build_skips_enumeration() {
    let tmp = TempDir::new().unwrap();
    let inv = invocation(&tmp);
    // Files left behind by a failed build must not be reported.
    let runner = FakeBuildTool::new(&inv.output_dir, Some(1), vec!["partial.zip"]);
    let toolchain = Toolchain::new("/opt/renkit");

    let err = BuildDispatcher::new(&toolchain, &runner)
        .dispatch(&inv)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::BuildFailed {
            exit_code: Some(1),
            ..
        }
    ));
}

#[tokio::test]
async fn empty_output_is_reported_as_is() {
    let tmp = TempDir::new().unwrap();
    let inv = invocation(&tmp);
    let runner = FakeBuildTool::new(&inv.output_dir, Some(0), vec![]);
    let toolchain = Toolchain::new("/opt/renkit");

    let artifacts = BuildDispatcher::new(&toolchain, &runner)
        .dispatch(&inv)
        .await
        .unwrap();

    assert!(artifacts.is_empty());
    assert_eq!(artifacts.output_dir(), inv.output_dir);
}
