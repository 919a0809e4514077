//! Release feed data model.

use chrono::{DateTime, Utc};
use rigup_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A published toolchain release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release tag, unique within a feed
    pub tag_name: String,
    /// Publish time; drafts have none
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Downloadable files, in feed order
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File name, encoding target OS and architecture
    pub name: String,
    /// Direct download URL
    pub browser_download_url: String,
}

/// Releases of one feed, newest first.
///
/// A catalog always holds at least one release.
#[derive(Debug, Clone)]
pub struct Catalog {
    source: String,
    releases: Vec<Release>,
}

impl Catalog {
    /// Build a catalog, sorting releases by publish time, newest first.
    ///
    /// Releases without a publish time sort after all published ones; ties
    /// keep feed order.
    pub fn new(source: impl Into<String>, mut releases: Vec<Release>) -> Result<Self> {
        let source = source.into();
        if releases.is_empty() {
            return Err(Error::catalog_empty(source));
        }
        releases.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(Self { source, releases })
    }

    /// Endpoint the catalog was read from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The most recently published release.
    #[must_use]
    pub fn latest(&self) -> &Release {
        // Non-empty by construction
        &self.releases[0]
    }

    /// Look up a release by exact tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.tag_name == tag)
    }

    /// All releases, newest first.
    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Number of releases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, published: Option<&str>) -> Release {
        Release {
            tag_name: tag.into(),
            published_at: published.map(|p| p.parse().unwrap()),
            assets: vec![],
        }
    }

    #[test]
    fn test_catalog_sorts_newest_first() {
        let catalog = Catalog::new(
            "feed",
            vec![
                release("v1.0", Some("2023-01-01T00:00:00Z")),
                release("v2.0", Some("2024-06-01T00:00:00Z")),
                release("v1.1", Some("2023-05-01T00:00:00Z")),
            ],
        )
        .unwrap();

        let tags: Vec<_> = catalog
            .releases()
            .iter()
            .map(|r| r.tag_name.as_str())
            .collect();
        assert_eq!(tags, vec!["v2.0", "v1.1", "v1.0"]);
        assert_eq!(catalog.latest().tag_name, "v2.0");
    }

    #[test]
    fn test_catalog_sorts_across_timezones() {
        // 23:30 at UTC-05:00 is later than 02:00 UTC the next day
        let catalog = Catalog::new(
            "feed",
            vec![
                release("early", Some("2024-03-02T02:00:00Z")),
                release("late", Some("2024-03-01T23:30:00-05:00")),
            ],
        )
        .unwrap();
        assert_eq!(catalog.latest().tag_name, "late");
    }

    #[test]
    fn test_unpublished_releases_sort_last() {
        let catalog = Catalog::new(
            "feed",
            vec![
                release("draft", None),
                release("v1.0", Some("2023-01-01T00:00:00Z")),
            ],
        )
        .unwrap();
        assert_eq!(catalog.latest().tag_name, "v1.0");
        assert_eq!(catalog.releases()[1].tag_name, "draft");
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = Catalog::new("https://feed.test", vec![]).unwrap_err();
        assert!(matches!(err, Error::CatalogEmpty { .. }));
    }

    #[test]
    fn test_get_by_tag() {
        let catalog = Catalog::new(
            "feed",
            vec![release("v1.0", Some("2023-01-01T00:00:00Z"))],
        )
        .unwrap();
        assert!(catalog.get("v1.0").is_some());
        assert!(catalog.get("v1.0 ").is_none());
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.source(), "feed");
    }

    #[test]
    fn test_release_deserialization() {
        let json = r#"{
            "tag_name": "v4.1.0",
            "published_at": "2024-02-10T12:00:00Z",
            "draft": false,
            "assets": [
                {"name": "renkit-linux-amd64.zip", "browser_download_url": "https://dl/linux", "size": 10}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v4.1.0");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].name, "renkit-linux-amd64.zip");
    }

    #[test]
    fn test_release_deserialization_null_published_at() {
        let json = r#"{"tag_name": "draft", "published_at": null, "assets": []}"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert!(release.published_at.is_none());
    }
}
