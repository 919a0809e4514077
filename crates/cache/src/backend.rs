//! Directory cache abstraction.

use async_trait::async_trait;
use rigup_core::Result;
use std::path::PathBuf;

/// Outcome of a restore attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// The directories were restored from the entry stored under `key`
    Hit {
        /// Key of the restored entry
        key: String,
    },
    /// No entry exists for the key
    Miss,
}

impl CacheLookup {
    /// Whether the lookup restored an entry.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Outcome of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new entry was written under the key
    Written,
    /// An entry already existed under the key and was left untouched
    AlreadyPresent,
}

/// Key-value store for whole directories.
///
/// Entries are written once per key: the first save wins and later saves
/// under the same key leave the stored entry untouched.
#[async_trait]
pub trait DirectoryCache: Send + Sync {
    /// Restore `dirs` from the entry stored under `key`.
    async fn restore(&self, dirs: &[PathBuf], key: &str) -> Result<CacheLookup>;

    /// Persist `dirs` under `key`, unless an entry already exists.
    async fn save(&self, dirs: &[PathBuf], key: &str) -> Result<SaveOutcome>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
