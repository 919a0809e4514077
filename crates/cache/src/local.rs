//! Filesystem-backed directory cache storing tar+zstd archives.
//!
//! Layout of a store:
//!
//! ```text
//! <root>/
//!   depcache-7.5.3/
//!     0.tar.zst      # first cached directory
//!     1.tar.zst      # second cached directory, ...
//! ```
//!
//! An entry directory only appears once all of its archives were written, so
//! a reader never observes a partial entry.

use crate::backend::{CacheLookup, DirectoryCache, SaveOutcome};
use async_trait::async_trait;
use dirs::{cache_dir, home_dir};
use rigup_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const ARCHIVE_EXTENSION: &str = "tar.zst";

/// Inputs for determining the store root.
#[derive(Debug, Clone)]
struct StoreInputs {
    explicit: Option<PathBuf>,
    os_cache_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    temp_dir: PathBuf,
}

fn store_root_from_inputs(inputs: StoreInputs) -> Result<PathBuf> {
    // Resolution order (first writable wins):
    // 1) explicit store directory
    // 2) OS cache dir/rigup/depcache
    // 3) ~/.rigup/depcache
    // 4) TMPDIR/rigup/depcache
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = inputs.explicit.filter(|p| !p.as_os_str().is_empty()) {
        candidates.push(dir);
    }
    if let Some(os_cache) = inputs.os_cache_dir {
        candidates.push(os_cache.join("rigup/depcache"));
    }
    if let Some(home) = inputs.home_dir {
        candidates.push(home.join(".rigup/depcache"));
    }
    candidates.push(inputs.temp_dir.join("rigup/depcache"));

    for path in candidates {
        if path.exists() {
            let probe = path.join(".write_probe");
            if fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&probe)
                .is_ok()
            {
                let _ = fs::remove_file(&probe);
                return Ok(path);
            }
            continue;
        }
        if fs::create_dir_all(&path).is_ok() {
            return Ok(path);
        }
    }
    Err(Error::configuration(
        "Failed to determine a writable cache store directory",
    ))
}

/// Resolve the cache store root, preferring `explicit` when it is writable.
pub fn store_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    store_root_from_inputs(StoreInputs {
        explicit,
        os_cache_dir: cache_dir(),
        home_dir: home_dir(),
        temp_dir: std::env::temp_dir(),
    })
}

/// [`DirectoryCache`] that keeps entries on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDirectoryCache {
    root: PathBuf,
}

impl LocalDirectoryCache {
    /// Create a cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_dir(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl DirectoryCache for LocalDirectoryCache {
    async fn restore(&self, dirs: &[PathBuf], key: &str) -> Result<CacheLookup> {
        let entry = self.entry_dir(key)?;
        if !entry.is_dir() {
            debug!(%key, entry = %entry.display(), "No cache entry");
            return Ok(CacheLookup::Miss);
        }

        let dirs = dirs.to_vec();
        let key_owned = key.to_string();
        tokio::task::spawn_blocking(move || restore_entry(&entry, &dirs, &key_owned))
            .await
            .map_err(|e| Error::cache(key, format!("restore task failed: {e}")))??;

        Ok(CacheLookup::Hit {
            key: key.to_string(),
        })
    }

    async fn save(&self, dirs: &[PathBuf], key: &str) -> Result<SaveOutcome> {
        if dirs.is_empty() {
            return Err(Error::cache(key, "no directories to save"));
        }
        let entry = self.entry_dir(key)?;
        if entry.exists() {
            warn!(
                %key,
                entry = %entry.display(),
                "Cache entry already exists, keeping the stored one"
            );
            return Ok(SaveOutcome::AlreadyPresent);
        }

        let root = self.root.clone();
        let dirs = dirs.to_vec();
        let key_owned = key.to_string();
        tokio::task::spawn_blocking(move || save_entry(&root, &entry, &dirs, &key_owned))
            .await
            .map_err(|e| Error::cache(key, format!("save task failed: {e}")))?
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.starts_with('.')
        && !key.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(Error::cache(key, "key is not a valid entry name"))
    }
}

fn archive_name(index: usize) -> String {
    format!("{index}.{ARCHIVE_EXTENSION}")
}

fn restore_entry(entry: &Path, dirs: &[PathBuf], key: &str) -> Result<()> {
    for (index, dir) in dirs.iter().enumerate() {
        let archive = entry.join(archive_name(index));
        if !archive.is_file() {
            return Err(Error::cache(
                key,
                format!("entry has no archive for {}", dir.display()),
            ));
        }
        fs::create_dir_all(dir).map_err(|e| Error::io(e, dir, "create"))?;
        unpack_tar_zst(&archive, dir, key)?;
        debug!(%key, dir = %dir.display(), "Restored cached directory");
    }
    Ok(())
}

fn save_entry(root: &Path, entry: &Path, dirs: &[PathBuf], key: &str) -> Result<SaveOutcome> {
    fs::create_dir_all(root).map_err(|e| Error::io(e, root, "create"))?;

    let staging = root.join(format!(".{key}.{}.tmp", std::process::id()));
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| Error::io(e, &staging, "remove"))?;
    }
    fs::create_dir_all(&staging).map_err(|e| Error::io(e, &staging, "create"))?;

    let written = (|| -> Result<()> {
        for (index, dir) in dirs.iter().enumerate() {
            if !dir.is_dir() {
                return Err(Error::cache(
                    key,
                    format!("{} is not a directory", dir.display()),
                ));
            }
            snapshot_tar_zst(dir, &staging.join(archive_name(index)), key)?;
        }
        Ok(())
    })();

    if let Err(e) = written {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    match fs::rename(&staging, entry) {
        Ok(()) => {
            info!(%key, entry = %entry.display(), "Saved cache entry");
            Ok(SaveOutcome::Written)
        }
        Err(_) if entry.exists() => {
            // Another writer committed the same key first.
            let _ = fs::remove_dir_all(&staging);
            warn!(%key, "Cache entry already exists, keeping the stored one");
            Ok(SaveOutcome::AlreadyPresent)
        }
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            Err(Error::io(e, entry, "rename"))
        }
    }
}

/// Write `src_root` into a compressed tar archive at `dst_file`.
fn snapshot_tar_zst(src_root: &Path, dst_file: &Path, key: &str) -> Result<()> {
    let file = fs::File::create(dst_file).map_err(|e| Error::io(e, dst_file, "create"))?;
    let enc = zstd::Encoder::new(file, 3)
        .map_err(|e| Error::cache(key, format!("zstd encoder error: {e}")))?;
    let mut builder = tar::Builder::new(enc);
    builder.follow_symlinks(false);

    builder
        .append_dir_all(".", src_root)
        .map_err(|e| Error::cache(key, format!("tar append failed: {e}")))?;

    let enc = builder
        .into_inner()
        .map_err(|e| Error::cache(key, format!("tar finalize failed: {e}")))?;
    enc.finish()
        .map_err(|e| Error::cache(key, format!("zstd finish failed: {e}")))?;
    Ok(())
}

/// Unpack a compressed tar archive into `dst_root`.
fn unpack_tar_zst(archive: &Path, dst_root: &Path, key: &str) -> Result<()> {
    let file = fs::File::open(archive).map_err(|e| Error::io(e, archive, "open"))?;
    let dec = zstd::Decoder::new(file)
        .map_err(|e| Error::cache(key, format!("zstd decoder error: {e}")))?;
    let mut tar = tar::Archive::new(dec);
    tar.set_preserve_permissions(true);
    tar.unpack(dst_root)
        .map_err(|e| Error::cache(key, format!("tar unpack failed: {e}")))
}
