//! Toolchain version resolution against a catalog.

use crate::release::{Catalog, Release};
use tracing::{info, warn};

/// A release chosen for a requested tag.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRelease<'a> {
    /// The chosen release
    pub release: &'a Release,
    /// True when the requested tag was unknown and the newest release was used
    pub fell_back: bool,
}

/// Resolve `requested` to a release.
///
/// An exact tag match wins. Any other request, including a mistyped tag,
/// resolves to the most recent release; this never fails.
#[must_use]
pub fn resolve_toolchain<'a>(catalog: &'a Catalog, requested: &str) -> ResolvedRelease<'a> {
    if let Some(release) = catalog.get(requested) {
        info!(tag = %release.tag_name, "Using requested toolchain release");
        return ResolvedRelease {
            release,
            fell_back: false,
        };
    }

    let release = catalog.latest();
    warn!(
        requested,
        using = %release.tag_name,
        "Requested toolchain release not found; falling back to the most recent release"
    );
    ResolvedRelease {
        release,
        fell_back: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let release = |tag: &str, published: &str| Release {
            tag_name: tag.into(),
            published_at: Some(published.parse().unwrap()),
            assets: vec![],
        };
        Catalog::new(
            "feed",
            vec![
                release("v1.0", "2023-01-01T00:00:00Z"),
                release("v1.1", "2023-06-01T00:00:00Z"),
                release("v2.0", "2024-01-01T00:00:00Z"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_match() {
        let catalog = catalog();
        let resolved = resolve_toolchain(&catalog, "v1.1");
        assert_eq!(resolved.release.tag_name, "v1.1");
        assert!(!resolved.fell_back);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_latest() {
        let catalog = catalog();
        let resolved = resolve_toolchain(&catalog, "v9.9");
        assert_eq!(resolved.release.tag_name, "v2.0");
        assert!(resolved.fell_back);
    }

    #[test]
    fn test_latest_keyword_is_just_an_unknown_tag() {
        let catalog = catalog();
        let resolved = resolve_toolchain(&catalog, "latest");
        assert_eq!(resolved.release.tag_name, "v2.0");
        assert!(resolved.fell_back);
    }

    #[test]
    fn test_empty_request_falls_back() {
        let catalog = catalog();
        assert_eq!(resolve_toolchain(&catalog, "").release.tag_name, "v2.0");
    }
}
