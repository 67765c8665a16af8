//! Core domain types for the POIs client.
//!
//! These models are shared by the data adapters and the view-models. The
//! collaborator traits ([`FavouritesStore`], [`PlacesClient`],
//! [`LocationSource`], [`Geocoder`], [`PreferenceStore`]) mark the seams where
//! storage, HTTP and platform services plug in.

#![forbid(unsafe_code)]

pub mod device;
pub mod favourites;
mod location;
mod place;
pub mod places;
pub mod preferences;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use device::{
    AddressCandidate, DeviceLocator, GeocodeError, Geocoder, LocationError, LocationPermission,
    LocationSource,
};
pub use favourites::{FavouritesStore, FavouritesStoreError, FavouritesSubscription};
#[cfg(feature = "store-sqlite")]
pub use favourites::{SqliteFavouritesStore, SqliteFavouritesStoreError};
pub use location::{DeviceAddress, DeviceLocation, InvalidCoordinates};
pub use place::{FavouritePlace, PlaceId, RemotePlace};
pub use places::{PlacesClient, PlacesError};
pub use preferences::{PreferenceStore, Preferences, PreferencesError};
