//! Test-only collaborators used by unit and behaviour tests across the
//! workspace.
//!
//! Every double records how often it was called so tests can assert on the
//! sequencing of platform calls as well as on results.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::favourites::SnapshotFeed;
use crate::{
    AddressCandidate, DeviceLocation, FavouritePlace, FavouritesStore, FavouritesStoreError,
    FavouritesSubscription, GeocodeError, Geocoder, LocationError, LocationPermission,
    LocationSource, PlaceId, PlacesClient, PlacesError, PreferenceStore, Preferences,
    PreferencesError, RemotePlace,
};

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics when the runtime cannot be created.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build test runtime")
        .block_on(future)
}

/// In-memory [`FavouritesStore`] with the same ordering rules as SQLite.
#[derive(Debug, Default)]
pub struct MemoryFavouritesStore {
    rows: Mutex<Vec<FavouritePlace>>,
    feed: SnapshotFeed,
    failure: Option<FavouritesStoreError>,
}

impl MemoryFavouritesStore {
    /// Create a store pre-populated with `places` in order.
    pub fn with_places<I>(places: I) -> Self
    where
        I: IntoIterator<Item = FavouritePlace>,
    {
        Self {
            rows: Mutex::new(places.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Create a store whose every operation fails with `error`.
    #[must_use]
    pub fn failing(error: FavouritesStoreError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Observers still attached as of the last write.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn check(&self) -> Result<(), FavouritesStoreError> {
        self.failure.clone().map_or(Ok(()), Err)
    }

    fn mutate(&self, change: impl FnOnce(&mut Vec<FavouritePlace>)) {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        change(&mut rows);
        self.feed.publish(&rows);
    }
}

#[async_trait]
impl FavouritesStore for MemoryFavouritesStore {
    async fn insert(&self, place: &FavouritePlace) -> Result<(), FavouritesStoreError> {
        self.check()?;
        self.mutate(|rows| {
            rows.retain(|row| row.id != place.id);
            rows.push(place.clone());
        });
        Ok(())
    }

    async fn delete(&self, place: &FavouritePlace) -> Result<(), FavouritesStoreError> {
        self.check()?;
        self.mutate(|rows| rows.retain(|row| row.id != place.id));
        Ok(())
    }

    async fn get_by_id(&self, id: &PlaceId) -> Result<Option<FavouritePlace>, FavouritesStoreError> {
        self.check()?;
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.iter().find(|row| &row.id == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<FavouritePlace>, FavouritesStoreError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn observe_all(&self) -> Result<FavouritesSubscription, FavouritesStoreError> {
        self.check()?;
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.feed.subscribe(rows.clone()))
    }
}

/// In-memory [`PreferenceStore`].
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    prefs: Mutex<Preferences>,
    failure: Option<PreferencesError>,
}

impl MemoryPreferenceStore {
    /// Create a store seeded with `prefs`.
    #[must_use]
    pub fn with_preferences(prefs: Preferences) -> Self {
        Self {
            prefs: Mutex::new(prefs),
            failure: None,
        }
    }

    /// Create a store whose reads and writes fail with `error`.
    #[must_use]
    pub fn failing(error: PreferencesError) -> Self {
        Self {
            prefs: Mutex::default(),
            failure: Some(error),
        }
    }

    fn check(&self) -> Result<(), PreferencesError> {
        self.failure.clone().map_or(Ok(()), Err)
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Preferences, PreferencesError> {
        self.check()?;
        Ok(*self.prefs.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn set_search_radius(&self, radius_metres: u32) -> Result<(), PreferencesError> {
        self.check()?;
        self.prefs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .search_radius = radius_metres;
        Ok(())
    }

    fn set_last_location(&self, location: DeviceLocation) -> Result<(), PreferencesError> {
        self.check()?;
        self.prefs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_location = Some(location);
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum FixOutcome {
    Fix(DeviceLocation),
    Missing,
    Failure(String),
}

/// Scripted [`LocationSource`].
#[derive(Debug)]
pub struct StubLocationSource {
    permission: LocationPermission,
    outcome: FixOutcome,
    fix_requests: AtomicUsize,
}

impl StubLocationSource {
    fn new(permission: LocationPermission, outcome: FixOutcome) -> Self {
        Self {
            permission,
            outcome,
            fix_requests: AtomicUsize::new(0),
        }
    }

    /// Permission granted; every request yields `location`.
    #[must_use]
    pub fn granted(location: DeviceLocation) -> Self {
        Self::new(LocationPermission::Granted, FixOutcome::Fix(location))
    }

    /// Permission refused.
    #[must_use]
    pub fn denied() -> Self {
        Self::new(LocationPermission::Denied, FixOutcome::Missing)
    }

    /// Permission granted but the provider never produces a reading.
    #[must_use]
    pub fn without_fix() -> Self {
        Self::new(LocationPermission::Granted, FixOutcome::Missing)
    }

    /// Permission granted but the provider fails with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::new(
            LocationPermission::Granted,
            FixOutcome::Failure(message.to_owned()),
        )
    }

    /// Number of fixes requested so far.
    #[must_use]
    pub fn fix_requests(&self) -> usize {
        self.fix_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationSource for StubLocationSource {
    fn permission(&self) -> LocationPermission {
        self.permission
    }

    async fn current_fix(&self) -> Result<Option<DeviceLocation>, LocationError> {
        self.fix_requests.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            FixOutcome::Fix(location) => Ok(Some(*location)),
            FixOutcome::Missing => Ok(None),
            FixOutcome::Failure(message) => Err(LocationError::Unavailable {
                message: message.clone(),
            }),
        }
    }
}

/// Scripted [`Geocoder`].
#[derive(Debug)]
pub struct StubGeocoder {
    outcome: Result<Vec<AddressCandidate>, GeocodeError>,
    requests: AtomicUsize,
}

impl StubGeocoder {
    /// Answer every lookup with `candidates`.
    #[must_use]
    pub fn with_candidates(candidates: Vec<AddressCandidate>) -> Self {
        Self {
            outcome: Ok(candidates),
            requests: AtomicUsize::new(0),
        }
    }

    /// Fail every lookup with `error`.
    #[must_use]
    pub fn with_error(error: GeocodeError) -> Self {
        Self {
            outcome: Err(error),
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of lookups performed so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn reverse(
        &self,
        _location: DeviceLocation,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Arguments recorded by [`StubPlacesClient`] for each search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    /// Search origin.
    pub origin: DeviceLocation,
    /// Requested radius in metres.
    pub radius_metres: u32,
    /// API key passed through by the caller.
    pub api_key: String,
}

/// Scripted [`PlacesClient`].
#[derive(Debug)]
pub struct StubPlacesClient {
    outcome: Result<Vec<RemotePlace>, PlacesError>,
    requests: Mutex<Vec<NearbyRequest>>,
}

impl StubPlacesClient {
    /// Answer every search with `places`.
    #[must_use]
    pub fn with_places(places: Vec<RemotePlace>) -> Self {
        Self {
            outcome: Ok(places),
            requests: Mutex::default(),
        }
    }

    /// Fail every search with `error`.
    #[must_use]
    pub fn with_error(error: PlacesError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::default(),
        }
    }

    /// Searches performed so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<NearbyRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PlacesClient for StubPlacesClient {
    async fn fetch_nearby(
        &self,
        origin: DeviceLocation,
        radius_metres: u32,
        api_key: &str,
    ) -> Result<Vec<RemotePlace>, PlacesError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(NearbyRequest {
                origin,
                radius_metres,
                api_key: api_key.to_owned(),
            });
        self.outcome.clone()
    }

    fn photo_url(&self, reference: &str, api_key: &str) -> String {
        format!("https://photos.invalid/{reference}?key={api_key}")
    }
}

/// Build a search result with a stable identifier derived from `name`.
#[must_use]
pub fn remote_place(name: &str) -> RemotePlace {
    RemotePlace {
        place_id: Some(format!("id-{name}")),
        name: name.to_owned(),
        vicinity: format!("{name} Street"),
        location: DeviceLocation::new(33.5, -86.8),
        photo_references: Vec::new(),
        photo_url: None,
    }
}
