//! Release feed client.

use crate::http::{authorize, build_client};
use crate::release::{Catalog, Release};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rigup_core::{Error, Result};
use tracing::{debug, info};

/// Source of a release catalog.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the full catalog, newest release first.
    async fn fetch(&self) -> Result<Catalog>;
}

/// Reads a GitHub-style releases endpoint.
///
/// The endpoint must answer with a JSON array of
/// `{tag_name, published_at, assets: [{name, browser_download_url}]}`.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    url: String,
    token: Option<String>,
}

impl CatalogClient {
    /// Create a client for the feed at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.into(),
            token: None,
        })
    }

    /// Authenticate requests with a GitHub token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Feed endpoint.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReleaseSource for CatalogClient {
    async fn fetch(&self) -> Result<Catalog> {
        debug!(url = %self.url, "Fetching toolchain releases");

        let request = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        let response = authorize(request, self.token.as_deref())
            .send()
            .await
            .map_err(|e| Error::catalog_unavailable(&self.url, e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::catalog_status(&self.url, status.as_u16()));
        }

        let releases: Vec<Release> = response.json().await.map_err(|e| {
            Error::catalog_unavailable(&self.url, format!("invalid release feed: {e}"))
        })?;

        info!(url = %self.url, count = releases.len(), "Fetched toolchain releases");
        Catalog::new(&self.url, releases)
    }
}
