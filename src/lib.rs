//! Facade crate for the POIs client.
//!
//! This crate re-exports the core domain types and exposes the HTTP/file
//! adapters, the SQLite favourites store, and the view-models behind feature
//! flags.

#![forbid(unsafe_code)]

pub use pois_core::{
    AddressCandidate, DeviceAddress, DeviceLocation, DeviceLocator, FavouritePlace,
    FavouritesStore, FavouritesStoreError, FavouritesSubscription, GeocodeError, Geocoder,
    InvalidCoordinates, LocationError, LocationPermission, LocationSource, PlaceId, PlacesClient,
    PlacesError, PreferenceStore, Preferences, PreferencesError, RemotePlace,
};

#[cfg(feature = "store-sqlite")]
pub use pois_core::{SqliteFavouritesStore, SqliteFavouritesStoreError};

#[cfg(feature = "adapters")]
pub use pois_data::{
    ConfiguredLocationSource, FilePreferenceStore, HttpPlacesClient, HttpPlacesClientConfig,
    NominatimGeocoder,
};

#[cfg(feature = "viewmodels")]
pub use pois_app::{
    FavouriteToggle, HomeState, HomeViewModel, SearchState, SearchViewModel, SettingsState,
    SettingsViewModel, directions_url,
};
