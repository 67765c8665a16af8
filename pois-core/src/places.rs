//! Remote nearby-search contract.
//!
//! [`PlacesClient`] abstracts the single HTTP call used to discover places
//! around a coordinate. Implementations map the provider's response into
//! [`RemotePlace`] values and classify failures with [`PlacesError`].

use async_trait::async_trait;
use thiserror::Error;

use crate::{DeviceLocation, RemotePlace};

/// Errors from [`PlacesClient::fetch_nearby`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacesError {
    /// The request could not reach the places API.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL with the API key redacted.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL with the API key redacted.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The places API answered with a non-success HTTP status.
    #[error("places API returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Reason phrase or response description.
        message: String,
    },
    /// The places API rejected the request in its JSON status field.
    #[error("places API reported {status}: {message}")]
    Service {
        /// Status string from the response body, e.g. `REQUEST_DENIED`.
        status: String,
        /// Error message supplied alongside the status, if any.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse places response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
}

impl PlacesError {
    /// Whether the failure came from the API itself rather than the transport.
    #[must_use]
    pub const fn is_api_failure(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Service { .. })
    }
}

/// Nearby search against a remote places API.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use pois_core::{DeviceLocation, PlacesClient, PlacesError, RemotePlace};
///
/// struct EmptyClient;
///
/// #[async_trait]
/// impl PlacesClient for EmptyClient {
///     async fn fetch_nearby(
///         &self,
///         _origin: DeviceLocation,
///         _radius_metres: u32,
///         _api_key: &str,
///     ) -> Result<Vec<RemotePlace>, PlacesError> {
///         Ok(Vec::new())
///     }
///
///     fn photo_url(&self, reference: &str, api_key: &str) -> String {
///         format!("https://example.com/photo?ref={reference}&key={api_key}")
///     }
/// }
/// ```
#[async_trait]
pub trait PlacesClient: Send + Sync {
    /// Return places within `radius_metres` of `origin`.
    ///
    /// A radius of zero is forwarded unchanged; the API decides what it means.
    async fn fetch_nearby(
        &self,
        origin: DeviceLocation,
        radius_metres: u32,
        api_key: &str,
    ) -> Result<Vec<RemotePlace>, PlacesError>;

    /// Build the display URL for a photo reference without any network call.
    fn photo_url(&self, reference: &str, api_key: &str) -> String;
}
