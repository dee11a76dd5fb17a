//! versions::madison
//!
//! Version lookups against a madison service.
//!
//! The service answers `GET <base>?package=<p>&text=on&s=<dists>` with one
//! line per binary or source upload:
//!
//! ```text
//!  reportbug | 12.0.0       | stable     | source, all
//!  reportbug | 13.0.1       | unstable   | source, all
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;

use super::{compare_versions, VersionError, VersionSource};
use crate::core::types::PackageName;

/// Default madison endpoint.
pub const DEFAULT_MADISON_URL: &str = "https://qa.debian.org/madison.php";

/// User-Agent header value for queries.
const USER_AGENT_VALUE: &str = concat!("bugsmith/", env!("CARGO_PKG_VERSION"));

/// Request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Madison-backed [`VersionSource`].
#[derive(Debug, Clone)]
pub struct MadisonSource {
    client: Client,
    base_url: String,
}

impl MadisonSource {
    /// Create a source for the default endpoint.
    pub fn new() -> Result<Self, VersionError> {
        Self::with_base_url(DEFAULT_MADISON_URL)
    }

    /// Create a source for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, VersionError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| VersionError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Endpoint this source queries.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Parse madison text output into the highest version per distribution.
///
/// Malformed lines are skipped. The distribution column may carry a
/// component suffix (`stable/contrib`); it is dropped.
pub fn parse_madison(text: &str) -> BTreeMap<String, String> {
    let mut versions: BTreeMap<String, String> = BTreeMap::new();

    for line in text.lines() {
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        let [_, version, dist, _] = fields.as_slice() else {
            continue;
        };
        if version.is_empty() || dist.is_empty() {
            continue;
        }
        let dist = dist.split('/').next().unwrap_or_default();

        match versions.get(dist) {
            Some(current) if compare_versions(current, version).is_ge() => {}
            _ => {
                versions.insert(dist.to_string(), version.to_string());
            }
        }
    }

    versions
}

#[async_trait]
impl VersionSource for MadisonSource {
    fn name(&self) -> &'static str {
        "madison"
    }

    async fn available(
        &self,
        package: &PackageName,
        dists: &[String],
    ) -> Result<BTreeMap<String, String>, VersionError> {
        let dists = dists.join(",");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("package", package.as_str()),
                ("text", "on"),
                ("s", dists.as_str()),
            ])
            .send()
            .await
            .map_err(|e| VersionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VersionError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VersionError::Network(e.to_string()))?;

        Ok(parse_madison(&body))
    }
}
