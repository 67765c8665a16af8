//! `PlacesClient` backed by the Google Places nearby-search API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use pois_core::{DeviceLocation, PlacesClient, PlacesError, RemotePlace};
use reqwest::Client;
use url::Url;

use super::google::{NearbySearchResponse, PlaceResult};
use crate::http::{ClientBuildError, REDACTED, build_client, endpoint, parse_base_url};

/// Default user agent for places requests.
pub const DEFAULT_USER_AGENT: &str = "pois-places/0.1";

/// Default base URL of the places API.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Width requested for photo thumbnails.
const PHOTO_MAX_WIDTH: u32 = 400;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpPlacesClient`].
#[derive(Debug, Clone)]
pub struct HttpPlacesClientConfig {
    /// Base URL for the places API (e.g., `"https://maps.googleapis.com"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpPlacesClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpPlacesClientConfig {
    /// Create a configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP places client issuing one nearby-search GET per call.
///
/// The API key is supplied per call rather than stored, so one client can
/// serve several keys. Keys never appear in logs or error values.
#[derive(Debug, Clone)]
pub struct HttpPlacesClient {
    client: Client,
    config: HttpPlacesClientConfig,
    base: Url,
}

impl HttpPlacesClient {
    /// Create a client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpPlacesClientConfig::new(base_url))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpPlacesClientConfig) -> Result<Self, ClientBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            config,
            base,
        })
    }

    /// Configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &HttpPlacesClientConfig {
        &self.config
    }

    /// Build the nearby-search URL.
    ///
    /// The format is
    /// `{base}/maps/api/place/nearbysearch/json?location=<lat,lng>&radius=<m>&key=<key>`.
    fn nearby_url(&self, origin: DeviceLocation, radius_metres: u32, api_key: &str) -> Url {
        let mut url = endpoint(&self.base, "maps/api/place/nearbysearch/json");
        url.query_pairs_mut()
            .append_pair("location", &origin.to_string())
            .append_pair("radius", &radius_metres.to_string())
            .append_pair("key", api_key);
        url
    }

    /// Convert a reqwest error to a `PlacesError`.
    ///
    /// The request URL is stripped from `error` because it carries the key;
    /// `url` is the redacted form.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> PlacesError {
        let stripped = error.without_url();
        if stripped.is_timeout() {
            return PlacesError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = stripped.status() {
            return PlacesError::Api {
                status: status.as_u16(),
                message: stripped.to_string(),
            };
        }

        PlacesError::Network {
            url: url.to_owned(),
            message: stripped.to_string(),
        }
    }

    /// Convert a nearby-search body into places around `origin`.
    fn convert_response(
        &self,
        response: NearbySearchResponse,
        origin: DeviceLocation,
        api_key: &str,
    ) -> Result<Vec<RemotePlace>, PlacesError> {
        if !response.is_ok() {
            return Err(PlacesError::Service {
                status: response.status.unwrap_or_default(),
                message: response.error_message.unwrap_or_default(),
            });
        }

        Ok(response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|result| self.convert_place(result, origin, api_key))
            .collect())
    }

    fn convert_place(
        &self,
        result: PlaceResult,
        origin: DeviceLocation,
        api_key: &str,
    ) -> RemotePlace {
        // Places without geometry are pinned to the search origin.
        let location = result
            .coordinates()
            .map_or(origin, |(lat, lng)| DeviceLocation::new(lat, lng));
        let photo_references = result.photo_references();
        let photo_url = photo_references
            .first()
            .map(|reference| self.photo_url(reference, api_key));
        RemotePlace {
            place_id: result.place_id,
            name: result.name.unwrap_or_default(),
            vicinity: result.vicinity.unwrap_or_default(),
            location,
            photo_references,
            photo_url,
        }
    }
}

#[async_trait]
impl PlacesClient for HttpPlacesClient {
    async fn fetch_nearby(
        &self,
        origin: DeviceLocation,
        radius_metres: u32,
        api_key: &str,
    ) -> Result<Vec<RemotePlace>, PlacesError> {
        let url = self.nearby_url(origin, radius_metres, api_key);
        let display_url = self.nearby_url(origin, radius_metres, REDACTED).to_string();
        debug!("requesting nearby places: {display_url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &display_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_owned(),
            });
        }

        let body: NearbySearchResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                self.convert_reqwest_error(err, &display_url)
            } else {
                PlacesError::Parse {
                    message: err.without_url().to_string(),
                }
            }
        })?;

        let places = self.convert_response(body, origin, api_key)?;
        debug!("fetched {} places around {origin}", places.len());
        Ok(places)
    }

    fn photo_url(&self, reference: &str, api_key: &str) -> String {
        let mut url = endpoint(&self.base, "maps/api/place/photo");
        url.query_pairs_mut()
            .append_pair("photoreference", reference)
            .append_pair("key", api_key)
            .append_pair("maxwidth", &PHOTO_MAX_WIDTH.to_string());
        url.into()
    }
}
