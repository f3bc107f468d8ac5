use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::version::{DriverVersion, VersionParseError};

/// Matches a release mention such as `Latest-Release:-ChromeDriver-2.41`,
/// capturing the numeric token. The trailing `[^"]` keeps the match out of
/// quoted attribute values embedded in the page markup.
static LATEST_RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Latest-Release:-ChromeDriver-([0-9]+\.[0-9]+)[^"]"#)
        .expect("release pattern should compile")
});

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("failed to fetch release listing from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("release listing fetch failed with HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("no release version token found in the listing page")]
    NoVersionToken,
    #[error(transparent)]
    Version(#[from] VersionParseError),
}

/// Extract the latest published driver version from the listing page body.
///
/// The page mentions every release it still links to; the last match in
/// document order is taken as the most recent, as the vendor appends newer
/// mentions after older ones.
///
/// # Errors
/// Returns [`ReleaseError::NoVersionToken`] when nothing on the page matches
/// the release pattern.
pub fn parse_latest_version(page: &str) -> Result<DriverVersion, ReleaseError> {
    let token = LATEST_RELEASE
        .captures_iter(page)
        .last()
        .and_then(|captures| captures.get(1))
        .ok_or(ReleaseError::NoVersionToken)?;

    debug!("latest release token on listing page: {}", token.as_str());
    Ok(token.as_str().parse()?)
}

/// Fetch the release listing page and resolve the latest published version.
///
/// # Errors
/// Returns an error when the page cannot be retrieved, the server responds
/// with a non-success status, or no version token is found in the body.
pub async fn fetch_latest_version(
    client: &reqwest::Client,
    listing_url: &str,
) -> Result<DriverVersion, ReleaseError> {
    let response = client
        .get(listing_url)
        .send()
        .await
        .map_err(|source| ReleaseError::Request {
            url: listing_url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(ReleaseError::Status {
            url: listing_url.to_string(),
            status: response.status(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|source| ReleaseError::Request {
            url: listing_url.to_string(),
            source,
        })?;

    parse_latest_version(&body)
}
