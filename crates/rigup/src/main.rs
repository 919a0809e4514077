//! rigup binary
//!
//! Parses inputs, initializes tracing, runs the orchestrator with the real
//! collaborators and publishes the run outputs.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use rigup::cli::{Cli, CliError, EXIT_FAILURE, EXIT_OK, exit_code_for, render_error};
use rigup::outputs::GITHUB_OUTPUT_VAR;
use rigup::tracing::{TracingConfig, correlation_id, init_tracing};
use rigup::{Orchestrator, RunOutputs};
use rigup_cache::{LocalDirectoryCache, store_root};
use rigup_catalog::{CatalogClient, ZipToolchainInstaller, token_from_env};
use rigup_core::{Error, ProcessRunner};
use std::path::PathBuf;
use tracing::Instrument;

fn main() {
    // NOTE: eprintln! in the panic hook is intentional - tracing may be
    // unusable during a panic.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = Cli::parse();
    std::process::exit(run_with_tokio(cli));
}

/// Create tokio runtime and run the async path
fn run_with_tokio(cli: Cli) -> i32 {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            return EXIT_FAILURE;
        }
    };

    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> i32 {
    let config = TracingConfig {
        format: cli.log_format,
        level: cli.log_level.into(),
    };
    if let Err(e) = init_tracing(config) {
        eprintln!("Failed to initialize tracing: {e}");
        return EXIT_FAILURE;
    }

    let span = tracing::info_span!("run", correlation_id = %correlation_id());
    match execute(&cli).instrument(span).await {
        Ok(()) => EXIT_OK,
        Err(err) => {
            tracing::error!(error = %err, "Run failed");
            render_error(&err);
            exit_code_for(&err)
        }
    }
}

async fn execute(cli: &Cli) -> Result<(), CliError> {
    let cwd = std::env::current_dir().map_err(|e| Error::io_no_path(e, "read working directory"))?;
    let inputs = cli.to_inputs(&cwd)?;

    let token = token_from_env();
    let source = CatalogClient::new(&inputs.catalog_url)?.with_token(token.clone());
    let installer = ZipToolchainInstaller::new()?.with_token(token);
    let cache = LocalDirectoryCache::new(store_root(cli.cache_store.clone())?);
    let runner = ProcessRunner::new();

    tracing::info!(
        toolchain = %inputs.toolchain_version,
        runtime = %inputs.runtime_version,
        config = %inputs.build_config.display(),
        store = %cache.root().display(),
        "Starting run"
    );

    let outcome = Orchestrator::new(&source, &installer, &cache, &runner)
        .run(&inputs)
        .await?;

    tracing::info!(
        toolchain = %outcome.toolchain_tag,
        runtime = %outcome.runtime_version,
        cache_hit = outcome.cache.is_hit(),
        artifacts = outcome.artifacts.len(),
        "Run finished"
    );

    let github_output = std::env::var_os(GITHUB_OUTPUT_VAR).map(PathBuf::from);
    RunOutputs::from(&outcome).emit(github_output.as_deref(), &mut std::io::stdout().lock())?;
    Ok(())
}
