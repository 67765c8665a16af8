//! Adapters connecting the POIs core to the outside world.
//!
//! - [`places`]: nearby search over HTTP.
//! - [`NominatimGeocoder`]: reverse geocoding over HTTP.
//! - [`ConfiguredLocationSource`]: a location source fed from settings.
//! - [`FilePreferenceStore`]: preferences persisted as JSON.

#![forbid(unsafe_code)]

mod fs;
mod geocode;
mod http;
mod location;
pub mod places;
mod preferences;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use geocode::{DEFAULT_GEOCODER_URL, DEFAULT_GEOCODER_USER_AGENT, NominatimGeocoder};
pub use http::ClientBuildError;
pub use location::ConfiguredLocationSource;
pub use places::{HttpPlacesClient, HttpPlacesClientConfig};
pub use preferences::{FilePreferenceStore, PREFERENCES_FILE};
