//! Runtime version resolution.

use rigup_core::{CommandRunner, Error, Result, RuntimeVersionRequest, Toolchain};
use tracing::{debug, info};

/// Turn a version request into a concrete version string.
///
/// An exact request is returned verbatim without invoking anything. `latest`
/// asks the version tool for the single newest version and uses its trimmed
/// stdout.
pub async fn resolve_runtime_version(
    request: &RuntimeVersionRequest,
    toolchain: &Toolchain,
    runner: &dyn CommandRunner,
) -> Result<String> {
    let RuntimeVersionRequest::Exact(version) = request else {
        debug!("Querying newest runtime version");
        let spec = toolchain.list_versions(1);
        let output = runner
            .run(&spec)
            .await
            .map_err(|e| Error::version_list_unavailable(e.to_string()))?;

        if !output.success() {
            return Err(Error::version_list_unavailable(match output.exit_code {
                Some(code) => format!("{} exited with code {code}", spec.program_name()),
                None => format!("{} terminated by signal", spec.program_name()),
            }));
        }

        let version = output.stdout.trim();
        if version.is_empty() {
            return Err(Error::version_list_unavailable(
                "version tool printed no version",
            ));
        }

        info!(%version, "Resolved latest runtime version");
        return Ok(version.to_string());
    };

    Ok(version.clone())
}
