//! Runtime dependency caching for rigup.
//!
//! The runtime a build needs is expensive to install, so it is cached under a
//! key derived from its version. [`CacheManager`] restores it when an entry
//! exists and otherwise installs it and stores the result.

#![warn(missing_docs)]

mod backend;
mod key;
mod local;
mod manager;

pub use backend::{CacheLookup, DirectoryCache, SaveOutcome};
pub use key::{CACHE_KEY_PREFIX, CacheKey};
pub use local::{LocalDirectoryCache, store_root};
pub use manager::{CacheManager, CacheOutcome, CacheState};
