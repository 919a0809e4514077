//! Restore-or-install flow for the runtime dependency.

use crate::backend::{CacheLookup, DirectoryCache, SaveOutcome};
use crate::key::CacheKey;
use rigup_core::{CommandRunner, Error, Result, Toolchain};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How the runtime dependency ended up in the cache directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Restored from the cache
    Hit,
    /// Installed fresh
    Miss,
}

/// Result of [`CacheManager::ensure_runtime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOutcome {
    /// Key the runtime is stored under
    pub key: CacheKey,
    /// Whether the runtime was restored or installed
    pub state: CacheState,
    /// Directory holding the runtime
    pub dir: PathBuf,
    /// Whether a fresh install was written to the cache. False when an entry
    /// already stored under the key was kept instead.
    pub saved: bool,
}

impl CacheOutcome {
    /// Whether the runtime came from the cache.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.state == CacheState::Hit
    }
}

/// Makes the runtime dependency available, restoring it from the cache when
/// possible and installing and saving it otherwise.
pub struct CacheManager<'a> {
    cache: &'a dyn DirectoryCache,
    runner: &'a dyn CommandRunner,
}

impl<'a> CacheManager<'a> {
    /// Create a manager over `cache`, running installs through `runner`.
    pub fn new(cache: &'a dyn DirectoryCache, runner: &'a dyn CommandRunner) -> Self {
        Self { cache, runner }
    }

    /// Ensure runtime `version` is present in `cache_dir`.
    ///
    /// A failing restore counts as a miss. A failing save is logged and the
    /// run continues; only a failing install is an error.
    pub async fn ensure_runtime(
        &self,
        toolchain: &Toolchain,
        version: &str,
        cache_dir: &Path,
    ) -> Result<CacheOutcome> {
        let key = CacheKey::for_runtime(version);
        let dirs = [cache_dir.to_path_buf()];

        info!(%key, backend = self.cache.name(), "Attempting to restore runtime from cache");
        let lookup = match self.cache.restore(&dirs, key.as_str()).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(%key, error = %e, "Cache restore failed, treating as miss");
                CacheLookup::Miss
            }
        };

        if let CacheLookup::Hit { key: restored } = lookup {
            info!(key = %restored, dir = %cache_dir.display(), "Restored runtime from cache");
            return Ok(CacheOutcome {
                key,
                state: CacheState::Hit,
                dir: cache_dir.to_path_buf(),
                saved: false,
            });
        }

        info!(%key, %version, "Runtime not cached, installing");
        std::fs::create_dir_all(cache_dir).map_err(|e| Error::io(e, cache_dir, "create"))?;

        let spec = toolchain.install_runtime(cache_dir, version);
        let output = self
            .runner
            .run(&spec)
            .await
            .map_err(|e| Error::install_failed(version, e.to_string()))?;
        if !output.success() {
            let reason = output.exit_code.map_or_else(
                || "installer terminated by signal".to_string(),
                |code| format!("installer exited with code {code}"),
            );
            return Err(Error::install_failed(version, reason));
        }

        let saved = match self.cache.save(&dirs, key.as_str()).await {
            Ok(SaveOutcome::Written) => {
                info!(%key, "Saved runtime to cache");
                true
            }
            Ok(SaveOutcome::AlreadyPresent) => {
                warn!(
                    %key,
                    "Runtime not saved, the cache already holds an entry under this key"
                );
                false
            }
            Err(e) => {
                warn!(%key, error = %e, "Failed to save runtime to cache");
                false
            }
        };

        Ok(CacheOutcome {
            key,
            state: CacheState::Miss,
            dir: cache_dir.to_path_buf(),
            saved,
        })
    }
}
