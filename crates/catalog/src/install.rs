//! Toolchain download and extraction.

use crate::http::{authorize, build_client};
use crate::release::{Asset, Release};
use async_trait::async_trait;
use reqwest::Client;
use rigup_core::{Error, Result};
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Marker file recording which release a toolchain directory holds.
pub const RELEASE_MARKER: &str = ".rigup-release";

/// A toolchain extracted on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledToolchain {
    /// Release tag
    pub tag: String,
    /// Directory holding the toolchain executables
    pub dir: PathBuf,
    /// True when an existing extraction of the same release was reused
    pub reused: bool,
}

/// Places a release asset on disk.
#[async_trait]
pub trait ToolchainInstaller: Send + Sync {
    /// Install `asset` of `release` under the toolchain directory `dest`.
    async fn install(&self, release: &Release, asset: &Asset, dest: &Path)
    -> Result<InstalledToolchain>;
}

/// Downloads zip assets over HTTP and extracts them.
#[derive(Debug, Clone)]
pub struct ZipToolchainInstaller {
    client: Client,
    token: Option<String>,
}

impl ZipToolchainInstaller {
    /// Create an installer.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            token: None,
        })
    }

    /// Authenticate downloads with a GitHub token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    async fn download(&self, tag: &str, url: &str) -> Result<Vec<u8>> {
        debug!(%url, "Downloading toolchain asset");

        let response = authorize(self.client.get(url), self.token.as_deref())
            .send()
            .await
            .map_err(|e| Error::toolchain_install(tag, format!("download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::toolchain_install(
                tag,
                format!("download failed (HTTP {})", response.status()),
            ));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::toolchain_install(tag, format!("failed to read asset: {e}")))
    }
}

#[async_trait]
impl ToolchainInstaller for ZipToolchainInstaller {
    async fn install(
        &self,
        release: &Release,
        asset: &Asset,
        dest: &Path,
    ) -> Result<InstalledToolchain> {
        let tag = release.tag_name.clone();
        let dir = release_dir(dest, &tag)?;

        if installed_release(&dir).as_deref() == Some(tag.as_str()) {
            info!(%tag, dir = %dir.display(), "Toolchain already installed");
            return Ok(InstalledToolchain {
                tag,
                dir,
                reused: true,
            });
        }

        info!(%tag, asset = %asset.name, url = %asset.browser_download_url, "Downloading toolchain");
        let data = self.download(&tag, &asset.browser_download_url).await?;

        info!(%tag, dir = %dir.display(), "Extracting toolchain");
        let dir_owned = dir.clone();
        let tag_owned = tag.clone();
        tokio::task::spawn_blocking(move || extract_zip(&data, &dir_owned, &tag_owned))
            .await
            .map_err(|e| Error::toolchain_install(&tag, format!("extraction task failed: {e}")))??;

        Ok(InstalledToolchain {
            tag,
            dir,
            reused: false,
        })
    }
}

/// Directory under `toolchain_dir` that holds the extraction of `tag`.
///
/// The tag must be a single plain path component.
pub fn release_dir(toolchain_dir: &Path, tag: &str) -> Result<PathBuf> {
    let mut components = Path::new(tag).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if !tag.starts_with('.') => {
            Ok(toolchain_dir.join(name))
        }
        _ => Err(Error::toolchain_install(
            tag,
            "release tag is not usable as a directory name",
        )),
    }
}

/// Release tag recorded in `dir`, if any.
#[must_use]
pub fn installed_release(dir: &Path) -> Option<String> {
    std::fs::read_to_string(dir.join(RELEASE_MARKER))
        .ok()
        .map(|s| s.trim().to_string())
}

/// Extract a zip archive into `dest` and mark it as holding `tag`.
///
/// Entries land in a sibling temp directory first and are moved into place
/// only after every entry was written, so a failed extraction leaves no
/// partial toolchain behind. An existing `dest` is replaced only when it
/// carries a release marker; anything else is left alone and reported.
pub fn extract_zip(data: &[u8], dest: &Path, tag: &str) -> Result<()> {
    if dest.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(Error::toolchain_install(
            tag,
            format!("refusing to extract into {}: path contains `..`", dest.display()),
        ));
    }
    let (Some(parent), Some(name)) = (dest.parent(), dest.file_name()) else {
        return Err(Error::toolchain_install(
            tag,
            format!("invalid extraction target {}", dest.display()),
        ));
    };
    if dest.exists() && installed_release(dest).is_none() {
        return Err(Error::toolchain_install(
            tag,
            format!(
                "refusing to replace {}: it is not a toolchain directory",
                dest.display()
            ),
        ));
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| Error::toolchain_install(tag, format!("failed to open zip: {e}")))?;

    let temp_dir = parent.join(format!(".{}.tmp", name.to_string_lossy()));

    if temp_dir.exists() {
        std::fs::remove_dir_all(&temp_dir).map_err(|e| Error::io(e, &temp_dir, "remove"))?;
    }
    std::fs::create_dir_all(&temp_dir).map_err(|e| Error::io(e, &temp_dir, "create"))?;

    let extract_result = (|| -> Result<()> {
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| {
                Error::toolchain_install(tag, format!("failed to read zip entry: {e}"))
            })?;

            let Some(relative) = file.enclosed_name() else {
                continue;
            };
            let outpath = temp_dir.join(relative);

            if file.is_dir() {
                std::fs::create_dir_all(&outpath).map_err(|e| Error::io(e, &outpath, "create"))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create"))?;
            }
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .map_err(|e| Error::toolchain_install(tag, format!("corrupt zip entry: {e}")))?;
            std::fs::write(&outpath, &content).map_err(|e| Error::io(e, &outpath, "write"))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mode = file.unix_mode().unwrap_or(0o755);
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| Error::io(e, &outpath, "chmod"))?;
            }
        }

        let marker = temp_dir.join(RELEASE_MARKER);
        std::fs::write(&marker, tag).map_err(|e| Error::io(e, &marker, "write"))?;
        Ok(())
    })();

    if let Err(e) = extract_result {
        let _ = std::fs::remove_dir_all(&temp_dir);
        return Err(e);
    }

    if dest.exists() {
        debug!(dir = %dest.display(), "Replacing previous toolchain");
        std::fs::remove_dir_all(dest).map_err(|e| Error::io(e, dest, "remove"))?;
    }
    std::fs::rename(&temp_dir, dest).map_err(|e| Error::io(e, dest, "rename"))?;
    Ok(())
}
