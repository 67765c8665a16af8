//! Reverse geocoding against a Nominatim server.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use pois_core::{AddressCandidate, DeviceLocation, GeocodeError, Geocoder};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::http::{ClientBuildError, build_client, endpoint, parse_base_url};

/// Default Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying user agent.
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "pois-geocoder/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// `/reverse` response in `jsonv2` format.
#[derive(Debug, Default, Deserialize)]
struct ReverseResponse {
    error: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

impl NominatimAddress {
    fn into_candidate(self) -> AddressCandidate {
        AddressCandidate {
            house_number: self.house_number,
            road: self.road,
            city: self.city.or(self.town).or(self.village),
            state: self.state,
            postcode: self.postcode,
        }
    }
}

/// [`Geocoder`] issuing `GET {base}/reverse` requests.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base: Url,
}

impl NominatimGeocoder {
    /// Create a geocoder for `base_url` with a ten second timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: &str) -> Result<Self, ClientBuildError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a geocoder with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        Ok(Self {
            client: build_client(DEFAULT_GEOCODER_USER_AGENT, timeout)?,
            base: parse_base_url(base_url)?,
        })
    }

    fn reverse_url(&self, location: DeviceLocation) -> Url {
        let mut url = endpoint(&self.base, "reverse");
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &location.latitude.to_string())
            .append_pair("lon", &location.longitude.to_string())
            .append_pair("addressdetails", "1");
        url
    }
}

fn unavailable(error: &reqwest::Error) -> GeocodeError {
    GeocodeError::ServiceUnavailable {
        message: error.to_string(),
    }
}

fn candidates(response: ReverseResponse) -> Vec<AddressCandidate> {
    if let Some(reason) = response.error {
        debug!("geocoder returned no address: {reason}");
        return Vec::new();
    }
    response
        .address
        .map(NominatimAddress::into_candidate)
        .into_iter()
        .collect()
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(
        &self,
        location: DeviceLocation,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        let url = self.reverse_url(location);
        debug!("reverse geocoding {location} via {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| {
                warn!("reverse geocoding failed: {err}");
                unavailable(&err)
            })?;

        let body: ReverseResponse = response.json().await.map_err(|err| unavailable(&err))?;
        Ok(candidates(body))
    }
}
