//! Shared HTTP plumbing for the remote adapters.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Placeholder substituted for API keys in logged and reported URLs.
pub(crate) const REDACTED: &str = "REDACTED";

/// Error type for HTTP adapter construction failures.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        /// Rejected URL text.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, ClientBuildError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(ClientBuildError::HttpClient)
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    Url::parse(raw).map_err(|source| ClientBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    })
}

/// Append `path` to the base URL's path, tolerating a trailing slash.
pub(crate) fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}/{}", base.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url.set_query(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://maps.example.com", "https://maps.example.com/a/b")]
    #[case("https://maps.example.com/", "https://maps.example.com/a/b")]
    #[case("http://127.0.0.1:8080/proxy/", "http://127.0.0.1:8080/proxy/a/b")]
    fn endpoint_joins_paths(#[case] base: &str, #[case] expected: &str) {
        let base = parse_base_url(base).expect("valid URL");
        assert_eq!(endpoint(&base, "a/b").as_str(), expected);
    }

    #[rstest]
    fn rejects_relative_base() {
        let err = parse_base_url("maps.example.com").expect_err("relative URL");
        assert!(matches!(err, ClientBuildError::InvalidBaseUrl { .. }));
    }
}
