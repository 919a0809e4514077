//! Shared HTTP client setup for GitHub endpoints.

use reqwest::{Client, RequestBuilder};
use rigup_core::{Error, Result};

/// User agent sent with every request; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("rigup/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used for feed and asset requests.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::configuration(format!("failed to create HTTP client: {e}")))
}

/// Read a GitHub token from `GITHUB_TOKEN`, then `GH_TOKEN`.
#[must_use]
pub fn token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|t| !t.trim().is_empty()))
}

/// Attach a bearer token when one is configured.
pub(crate) fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}
