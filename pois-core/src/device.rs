//! Device location and reverse geocoding.
//!
//! The platform supplies two collaborators: a [`LocationSource`] producing a
//! single best-effort fix behind a runtime permission, and a [`Geocoder`]
//! turning coordinates into address candidates. [`DeviceLocator`] sequences
//! them: an address lookup only happens after a successful fix.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DeviceAddress, DeviceLocation};

/// Outcome of the runtime location permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPermission {
    /// The user allowed access to precise location.
    Granted,
    /// Access was refused or has not been requested yet.
    Denied,
}

/// The platform could not produce a location fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The permission check failed; the fix provider was not consulted.
    #[error("location permission has not been granted")]
    PermissionDenied,
    /// The provider completed without a reading.
    #[error("the location service returned no fix")]
    NoFix,
    /// The provider failed.
    #[error("{message}")]
    Unavailable {
        /// Provider error description.
        message: String,
    },
}

/// Reverse geocoding failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The geocoding backend raised an error.
    #[error("geocoder service not available: {message}")]
    ServiceUnavailable {
        /// Backend error description.
        message: String,
    },
    /// The backend answered with no candidates.
    #[error("no address found for the location")]
    NotFound,
}

/// One address returned by a [`Geocoder`], split into components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressCandidate {
    /// Street number.
    pub house_number: Option<String>,
    /// Street name.
    pub road: Option<String>,
    /// City, town or village.
    pub city: Option<String>,
    /// State or other first-level administrative area.
    pub state: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
}

impl AddressCandidate {
    /// Format the candidate as a two-line [`DeviceAddress`].
    #[must_use]
    pub fn to_address(&self) -> DeviceAddress {
        DeviceAddress::from_parts(
            [self.house_number.as_deref(), self.road.as_deref()],
            [
                self.city.as_deref(),
                self.state.as_deref(),
                self.postcode.as_deref(),
            ],
        )
    }
}

/// Platform location service.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Report whether the location permission is currently held.
    fn permission(&self) -> LocationPermission;

    /// Request one high-accuracy fix.
    ///
    /// Callers must check [`LocationSource::permission`] first.
    async fn current_fix(&self) -> Result<Option<DeviceLocation>, LocationError>;
}

/// Platform reverse-geocoding service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Return address candidates for `location`, best match first.
    ///
    /// Backend failures are reported as [`GeocodeError::ServiceUnavailable`];
    /// an empty list is a valid answer.
    async fn reverse(&self, location: DeviceLocation)
    -> Result<Vec<AddressCandidate>, GeocodeError>;
}

/// Combined location-then-address lookup.
#[derive(Clone)]
pub struct DeviceLocator {
    source: Arc<dyn LocationSource>,
    geocoder: Arc<dyn Geocoder>,
}

impl std::fmt::Debug for DeviceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLocator")
            .field("permission", &self.source.permission())
            .finish_non_exhaustive()
    }
}

impl DeviceLocator {
    /// Combine a location source with a geocoder.
    #[must_use]
    pub fn new(source: Arc<dyn LocationSource>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { source, geocoder }
    }

    /// Obtain a single fix, gated by the permission check.
    pub async fn current_location(&self) -> Result<DeviceLocation, LocationError> {
        if self.source.permission() == LocationPermission::Denied {
            return Err(LocationError::PermissionDenied);
        }
        self.source.current_fix().await?.ok_or(LocationError::NoFix)
    }

    /// Convert `location` into the best matching address.
    pub async fn reverse_geocode(
        &self,
        location: DeviceLocation,
    ) -> Result<DeviceAddress, GeocodeError> {
        let candidates = self.geocoder.reverse(location).await?;
        candidates
            .first()
            .map(AddressCandidate::to_address)
            .ok_or(GeocodeError::NotFound)
    }

    /// Fetch a fix and then resolve its address.
    ///
    /// The outer error short-circuits before geocoding; the inner result
    /// carries the geocoding outcome for a fix that was obtained.
    pub async fn locate(
        &self,
    ) -> Result<(DeviceLocation, Result<DeviceAddress, GeocodeError>), LocationError> {
        let location = self.current_location().await?;
        let address = self.reverse_geocode(location).await;
        Ok((location, address))
    }
}
