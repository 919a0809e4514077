//! Cache key derivation.

use std::fmt;

/// Prefix shared by every runtime dependency cache key.
pub const CACHE_KEY_PREFIX: &str = "depcache-";

/// Deterministic key addressing one installed runtime version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for the runtime dependency at `version`.
    #[must_use]
    pub fn for_runtime(version: &str) -> Self {
        Self(format!("{CACHE_KEY_PREFIX}{version}"))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
