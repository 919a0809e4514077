//! Platform matching for release assets.
//!
//! Asset names follow `<tool>-<os>-<arch>.<ext>`. The os and arch tokens use
//! the feed's own vocabulary and are normalized through two independent
//! tables before being compared with the host [`Platform`].

use crate::release::{Asset, Release};
use rigup_core::{Arch, Error, Os, Platform, Result};
use tracing::debug;

/// Feed OS token to host OS.
pub const OS_TABLE: &[(&str, Os)] = &[
    ("windows", Os::Windows),
    ("linux", Os::Linux),
    ("macos", Os::Darwin),
];

/// Feed architecture token to host architecture.
pub const ARCH_TABLE: &[(&str, Arch)] = &[
    ("amd64", Arch::X64),
    ("i386", Arch::X86),
    ("arm64", Arch::Arm64),
];

/// Map a feed OS token.
#[must_use]
pub fn map_os(token: &str) -> Option<Os> {
    OS_TABLE
        .iter()
        .find_map(|(name, os)| (*name == token).then_some(*os))
}

/// Map a feed architecture token.
#[must_use]
pub fn map_arch(token: &str) -> Option<Arch> {
    ARCH_TABLE
        .iter()
        .find_map(|(name, arch)| (*name == token).then_some(*arch))
}

/// Extract the `(os, arch)` tokens from an asset file name.
///
/// `renkit-linux-amd64.zip` yields `("linux", "amd64")`. Fields after the
/// architecture are ignored.
#[must_use]
pub fn asset_tokens(name: &str) -> Option<(&str, &str)> {
    let stem = name.split('.').next()?;
    let mut fields = stem.split('-').skip(1);
    Some((fields.next()?, fields.next()?))
}

/// Whether `asset` targets `platform`.
#[must_use]
pub fn asset_matches(asset: &Asset, platform: Platform) -> bool {
    let Some((os, arch)) = asset_tokens(&asset.name) else {
        return false;
    };
    map_os(os) == Some(platform.os) && map_arch(arch) == Some(platform.arch)
}

/// Pick the first asset of `release` that targets `host`.
///
/// Assets are scanned in feed order and the first match wins; later
/// duplicates are ignored. `host` is `None` on unsupported hosts, which
/// never match.
pub fn select_asset(release: &Release, host: Option<Platform>) -> Result<&Asset> {
    let no_match = || {
        let platform = host.map_or_else(Platform::describe_host, |p| p.to_string());
        Error::no_matching_asset(&release.tag_name, platform)
    };
    let host = host.ok_or_else(no_match)?;

    let mut matching = release.assets.iter().filter(|a| asset_matches(a, host));
    let selected = matching.next().ok_or_else(no_match)?;

    let duplicates = matching.count();
    if duplicates > 0 {
        debug!(
            release = %release.tag_name,
            asset = %selected.name,
            duplicates,
            "Multiple assets match this platform; using the first"
        );
    }

    Ok(selected)
}
