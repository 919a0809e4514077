//! Toolchain release catalog for rigup.
//!
//! Fetches a GitHub-style release feed, picks the release for a requested
//! tag, selects the asset built for the host and extracts it.
//!
//! ```ignore
//! let catalog = CatalogClient::new(url)?.fetch().await?;
//! let resolved = resolve_toolchain(&catalog, "v4.0.0");
//! let asset = select_asset(resolved.release, Platform::current())?;
//! let installed = ZipToolchainInstaller::new()?
//!     .install(resolved.release, asset, &dir)
//!     .await?;
//! ```

mod client;
mod http;
mod install;
mod matcher;
mod release;
mod resolver;

pub use client::{CatalogClient, ReleaseSource};
pub use http::{USER_AGENT, token_from_env};
pub use install::{
    InstalledToolchain, RELEASE_MARKER, ToolchainInstaller, ZipToolchainInstaller, extract_zip,
    installed_release, release_dir,
};
pub use matcher::{ARCH_TABLE, OS_TABLE, asset_matches, asset_tokens, map_arch, map_os, select_asset};
pub use release::{Asset, Catalog, Release};
pub use resolver::{ResolvedRelease, resolve_toolchain};
