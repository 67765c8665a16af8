//! Home screen: current location, its address and the favourites list.

use std::sync::Arc;

use log::{debug, error, warn};
use pois_core::{
    DeviceAddress, DeviceLocation, DeviceLocator, FavouritePlace, FavouritesStore, GeocodeError,
    LocationError, PreferenceStore,
};
use tokio::sync::watch;

use crate::directions_url;

/// Observable state of the Home screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeState {
    /// Most recent device fix.
    pub location: Option<DeviceLocation>,
    /// Address resolved for `location`.
    pub address: Option<DeviceAddress>,
    /// Favourites in insertion order.
    pub favourites: Vec<FavouritePlace>,
    /// Last failure, formatted for display.
    pub error: Option<String>,
    /// Last informational notice, formatted for display.
    pub message: Option<String>,
    /// Whether a location refresh is in flight.
    pub refreshing: bool,
}

/// View-model behind the Home screen.
///
/// Construction does not touch any collaborator; call
/// [`HomeViewModel::refresh_favourites`] to populate the list.
pub struct HomeViewModel {
    store: Arc<dyn FavouritesStore>,
    locator: DeviceLocator,
    preferences: Arc<dyn PreferenceStore>,
    state: watch::Sender<HomeState>,
}

impl std::fmt::Debug for HomeViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeViewModel")
            .field("locator", &self.locator)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl HomeViewModel {
    /// Wire the view-model to its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn FavouritesStore>,
        locator: DeviceLocator,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let (state, _) = watch::channel(HomeState::default());
        Self {
            store,
            locator,
            preferences,
            state,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> HomeState {
        self.state.borrow().clone()
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    /// Reload the favourites list.
    pub async fn refresh_favourites(&self) {
        match self.store.get_all().await {
            Ok(favourites) => {
                debug!("loaded {} favourite places", favourites.len());
                self.state.send_modify(|state| state.favourites = favourites);
            }
            Err(err) => {
                error!("error refreshing favourite places: {err}");
                self.fail(format!("Failed to refresh favourite places: {err}"));
            }
        }
    }

    /// Obtain a fresh fix, save it and resolve its address.
    ///
    /// Returns immediately when a refresh is already running.
    pub async fn refresh_location(&self) {
        let started = self.state.send_if_modified(|state| {
            if state.refreshing {
                return false;
            }
            state.refreshing = true;
            state.error = None;
            state.message = None;
            true
        });
        if !started {
            debug!("location refresh already in progress");
            return;
        }

        match self.locator.locate().await {
            Ok((location, address)) => {
                debug!("fetched location {location}");
                if let Err(err) = self.preferences.set_last_location(location) {
                    warn!("failed to save location: {err}");
                }
                self.state.send_modify(|state| {
                    state.location = Some(location);
                    apply_address(state, address);
                    state.refreshing = false;
                });
            }
            Err(err) => {
                error!("failed to get location: {err}");
                self.state.send_modify(|state| {
                    state.error = Some(location_message(&err));
                    state.refreshing = false;
                });
            }
        }
    }

    /// Resolve the address of the location saved in preferences.
    ///
    /// Does nothing when no location has been saved yet.
    pub async fn load_saved_address(&self) {
        let saved = match self.preferences.last_location() {
            Ok(saved) => saved,
            Err(err) => {
                error!("failed to read saved location: {err}");
                self.fail(format!("Failed to read saved location: {err}"));
                return;
            }
        };
        let Some(location) = saved else {
            debug!("no saved location to resolve");
            return;
        };

        let address = self.locator.reverse_geocode(location).await;
        self.state.send_modify(|state| {
            state.location = Some(location);
            if address.is_ok() {
                state.message = Some("Address fetched successfully".to_owned());
            }
            apply_address(state, address);
        });
    }

    /// Delete `place` and reload the list.
    pub async fn unfavourite(&self, place: &FavouritePlace) {
        if let Err(err) = self.store.delete(place).await {
            error!("error unfavouriting place {}: {err}", place.id);
            self.fail(format!("Failed to unfavourite place: {err}"));
            return;
        }
        self.refresh_favourites().await;
    }

    /// Navigation link from the saved location to `place`.
    ///
    /// Falls back to the last fix held in state; `None` when neither exists.
    #[must_use]
    pub fn directions_url(&self, place: &FavouritePlace) -> Option<String> {
        let saved = self.preferences.last_location().unwrap_or_else(|err| {
            warn!("failed to read saved location: {err}");
            None
        });
        saved
            .or(self.state.borrow().location)
            .map(|origin| directions_url(origin, place.location))
    }

    fn fail(&self, message: String) {
        self.state.send_modify(|state| state.error = Some(message));
    }
}

fn apply_address(state: &mut HomeState, address: Result<DeviceAddress, GeocodeError>) {
    match address {
        Ok(address) => {
            debug!("fetched address {address:?}");
            state.address = Some(address);
        }
        Err(err) => {
            error!("reverse geocoding failed: {err}");
            state.error = Some(geocode_message(&err));
        }
    }
}

fn location_message(err: &LocationError) -> String {
    match err {
        LocationError::PermissionDenied => "Location access denied".to_owned(),
        other => format!("Failed to get location: {other}"),
    }
}

fn geocode_message(err: &GeocodeError) -> String {
    match err {
        GeocodeError::NotFound => "No address found for the location".to_owned(),
        GeocodeError::ServiceUnavailable { message } => {
            format!("Geocoder service not available: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pois_core::test_support::{
        MemoryFavouritesStore, MemoryPreferenceStore, StubGeocoder, StubLocationSource,
    };
    use pois_core::{AddressCandidate, FavouritesStoreError, PlaceId, PreferencesError};
    use rstest::{fixture, rstest};

    const HERE: DeviceLocation = DeviceLocation::new(33.5, -86.8);

    #[fixture]
    fn candidate() -> AddressCandidate {
        AddressCandidate {
            house_number: Some("1720".into()),
            road: Some("2nd Ave S".into()),
            city: Some("Birmingham".into()),
            state: Some("AL".into()),
            postcode: Some("35294".into()),
        }
    }

    fn favourite(id: &str) -> FavouritePlace {
        FavouritePlace {
            id: PlaceId::from(id),
            name: id.to_owned(),
            vicinity: String::new(),
            location: DeviceLocation::new(33.49, -86.79),
            photo_url: None,
        }
    }

    struct Harness {
        prefs: Arc<MemoryPreferenceStore>,
        source: Arc<StubLocationSource>,
        geocoder: Arc<StubGeocoder>,
        view_model: HomeViewModel,
    }

    fn harness(
        store: MemoryFavouritesStore,
        source: StubLocationSource,
        geocoder: StubGeocoder,
    ) -> Harness {
        let prefs = Arc::new(MemoryPreferenceStore::default());
        let source = Arc::new(source);
        let geocoder = Arc::new(geocoder);
        let locator = DeviceLocator::new(source.clone(), geocoder.clone());
        let view_model = HomeViewModel::new(Arc::new(store), locator, prefs.clone());
        Harness {
            prefs,
            source,
            geocoder,
            view_model,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_location_saves_fix_and_address(candidate: AddressCandidate) {
        let h = harness(
            MemoryFavouritesStore::default(),
            StubLocationSource::granted(HERE),
            StubGeocoder::with_candidates(vec![candidate]),
        );

        h.view_model.refresh_location().await;

        let state = h.view_model.state();
        assert_eq!(state.location, Some(HERE));
        assert_eq!(
            state.address.map(|address| address.street),
            Some("1720 2nd Ave S".to_owned())
        );
        assert_eq!(state.error, None);
        assert!(!state.refreshing);
        assert_eq!(h.prefs.last_location(), Ok(Some(HERE)));
    }

    #[rstest]
    #[tokio::test]
    async fn denied_permission_never_geocodes(candidate: AddressCandidate) {
        let h = harness(
            MemoryFavouritesStore::default(),
            StubLocationSource::denied(),
            StubGeocoder::with_candidates(vec![candidate]),
        );

        h.view_model.refresh_location().await;

        let state = h.view_model.state();
        assert_eq!(state.error.as_deref(), Some("Location access denied"));
        assert_eq!(state.location, None);
        assert_eq!(h.source.fix_requests(), 0);
        assert_eq!(h.geocoder.requests(), 0);
        assert_eq!(h.prefs.last_location(), Ok(None));
    }

    #[rstest]
    #[case(StubLocationSource::without_fix(), "Failed to get location: the location service returned no fix")]
    #[case(StubLocationSource::failing("gps off"), "Failed to get location: gps off")]
    #[tokio::test]
    async fn location_failures_are_reported(
        #[case] source: StubLocationSource,
        #[case] expected: &str,
    ) {
        let h = harness(
            MemoryFavouritesStore::default(),
            source,
            StubGeocoder::with_candidates(Vec::new()),
        );

        h.view_model.refresh_location().await;

        assert_eq!(h.view_model.state().error.as_deref(), Some(expected));
        assert_eq!(h.geocoder.requests(), 0);
    }

    #[rstest]
    #[case(StubGeocoder::with_candidates(Vec::new()), "No address found for the location")]
    #[case(
        StubGeocoder::with_error(GeocodeError::ServiceUnavailable { message: "offline".into() }),
        "Geocoder service not available: offline"
    )]
    #[tokio::test]
    async fn geocoding_failures_keep_the_fix(#[case] geocoder: StubGeocoder, #[case] expected: &str) {
        let h = harness(
            MemoryFavouritesStore::default(),
            StubLocationSource::granted(HERE),
            geocoder,
        );

        h.view_model.refresh_location().await;

        let state = h.view_model.state();
        assert_eq!(state.location, Some(HERE));
        assert_eq!(state.address, None);
        assert_eq!(state.error.as_deref(), Some(expected));
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_is_ignored_while_one_is_running() {
        let h = harness(
            MemoryFavouritesStore::default(),
            StubLocationSource::granted(HERE),
            StubGeocoder::with_candidates(Vec::new()),
        );
        h.view_model.state.send_modify(|state| state.refreshing = true);

        h.view_model.refresh_location().await;

        assert_eq!(h.source.fix_requests(), 0);
        assert!(h.view_model.state().refreshing);
    }

    #[rstest]
    #[tokio::test]
    async fn saved_address_is_loaded(candidate: AddressCandidate) {
        let h = harness(
            MemoryFavouritesStore::default(),
            StubLocationSource::denied(),
            StubGeocoder::with_candidates(vec![candidate]),
        );
        h.prefs.set_last_location(HERE).expect("seed location");

        h.view_model.load_saved_address().await;

        let state = h.view_model.state();
        assert_eq!(state.message.as_deref(), Some("Address fetched successfully"));
        assert_eq!(state.location, Some(HERE));
        assert!(state.address.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn saved_address_skips_geocoder_without_location() {
        let h = harness(
            MemoryFavouritesStore::default(),
            StubLocationSource::denied(),
            StubGeocoder::with_candidates(Vec::new()),
        );

        h.view_model.load_saved_address().await;

        assert_eq!(h.geocoder.requests(), 0);
        assert_eq!(h.view_model.state(), HomeState::default());
    }

    #[rstest]
    #[tokio::test]
    async fn unfavourite_removes_and_reloads() {
        let h = harness(
            MemoryFavouritesStore::with_places([favourite("a"), favourite("b")]),
            StubLocationSource::denied(),
            StubGeocoder::with_candidates(Vec::new()),
        );
        h.view_model.refresh_favourites().await;

        h.view_model.unfavourite(&favourite("a")).await;

        assert_eq!(h.view_model.state().favourites, vec![favourite("b")]);
    }

    #[rstest]
    #[tokio::test]
    async fn store_failures_are_reported() {
        let failure = FavouritesStoreError::Storage {
            operation: "list",
            message: "disk full".into(),
        };
        let h = harness(
            MemoryFavouritesStore::failing(failure),
            StubLocationSource::denied(),
            StubGeocoder::with_candidates(Vec::new()),
        );

        h.view_model.refresh_favourites().await;
        let refresh_error = h.view_model.state().error;
        h.view_model.unfavourite(&favourite("a")).await;
        let unfavourite_error = h.view_model.state().error;

        assert_eq!(
            refresh_error.as_deref(),
            Some("Failed to refresh favourite places: failed to list favourite places: disk full")
        );
        assert!(
            unfavourite_error
                .as_deref()
                .is_some_and(|message| message.starts_with("Failed to unfavourite place: "))
        );
    }

    #[rstest]
    fn directions_need_a_saved_location() {
        let h = harness(
            MemoryFavouritesStore::default(),
            StubLocationSource::denied(),
            StubGeocoder::with_candidates(Vec::new()),
        );
        assert_eq!(h.view_model.directions_url(&favourite("a")), None);

        h.prefs.set_last_location(HERE).expect("seed location");

        assert_eq!(
            h.view_model.directions_url(&favourite("a")).as_deref(),
            Some(
                "https://www.google.com/maps/dir/?api=1&origin=33.5,-86.8&destination=33.49,-86.79&dir_action=navigate"
            )
        );
    }

    #[rstest]
    fn unreadable_preferences_fall_back_to_state() {
        let prefs = Arc::new(MemoryPreferenceStore::failing(PreferencesError::Read {
            location: "memory".into(),
            message: "gone".into(),
        }));
        let locator = DeviceLocator::new(
            Arc::new(StubLocationSource::denied()),
            Arc::new(StubGeocoder::with_candidates(Vec::new())),
        );
        let view_model =
            HomeViewModel::new(Arc::new(MemoryFavouritesStore::default()), locator, prefs);
        view_model
            .state
            .send_modify(|state| state.location = Some(HERE));

        assert!(view_model.directions_url(&favourite("a")).is_some());
    }
}
