//! External process capability.
//!
//! Every external tool rigup drives (version listing, runtime install, build)
//! is described by a [`CommandSpec`] and executed through a [`CommandRunner`].
//! Stages never spawn processes themselves, so tests can substitute a fake
//! runner and assert on the exact invocations.

use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// A fully described external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Environment variables set for the child only
    pub env: BTreeMap<String, String>,
    /// Directories prepended to the child's `PATH`
    pub path_prepend: Vec<PathBuf>,
    /// Working directory, inherited when `None`
    pub current_dir: Option<PathBuf>,
    /// Capture stdout instead of streaming it to the console
    pub capture_stdout: bool,
}

impl CommandSpec {
    /// Create a command for the given program.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            path_prepend: Vec::new(),
            current_dir: None,
            capture_stdout: false,
        }
    }

    /// Append an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Prepend a directory to the child's `PATH`.
    #[must_use]
    pub fn prepend_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_prepend.push(dir.into());
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Capture stdout so the caller can read it.
    #[must_use]
    pub const fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    /// Program name without its directory, for log messages.
    #[must_use]
    pub fn program_name(&self) -> String {
        self.program.file_name().map_or_else(
            || self.program.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program_name())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Result of running an external command to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured stdout, empty unless capture was requested
    pub stdout: String,
}

impl CommandOutput {
    /// Create an output with the given exit code and stdout.
    #[must_use]
    pub fn new(exit_code: Option<i32>, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
        }
    }

    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Synchronous, run-to-completion command execution.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and wait for it to exit.
    ///
    /// A non-zero exit is reported through [`CommandOutput::exit_code`], not
    /// as an error. Errors are reserved for failing to start the process.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// [`CommandRunner`] that spawns real processes with tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "Running external command");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .stdout(if spec.capture_stdout {
                Stdio::piped()
            } else {
                Stdio::inherit()
            });

        if !spec.path_prepend.is_empty() {
            cmd.env("PATH", joined_path(&spec.path_prepend)?);
        }
        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }

        let program = spec.program.display().to_string();
        let mut child = cmd.spawn().map_err(|e| Error::process(&program, e))?;

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)
                .await
                .map_err(|e| Error::io_no_path(e, format!("read stdout of {program}")))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::io_no_path(e, format!("wait for {program}")))?;

        debug!(command = %spec, exit_code = ?status.code(), "External command finished");

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout,
        })
    }
}

/// Build a `PATH` value with `dirs` ahead of the inherited entries.
fn joined_path(dirs: &[PathBuf]) -> Result<OsString> {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let entries = dirs
        .iter()
        .cloned()
        .chain(std::env::split_paths(&inherited));
    std::env::join_paths(entries)
        .map_err(|e| Error::configuration(format!("invalid PATH entry: {e}")))
}

/// Resolve `name` to an executable file name inside `dir`.
#[must_use]
pub fn executable_in(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
}
