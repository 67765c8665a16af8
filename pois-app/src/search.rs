//! Search screen: nearby places and favourite toggling.

use std::sync::Arc;

use log::{debug, error, warn};
use pois_core::{
    DeviceLocation, FavouritePlace, FavouritesStore, FavouritesStoreError, PlaceId, PlacesClient,
    PreferenceStore, RemotePlace,
};
use tokio::{sync::watch, task::JoinHandle};

/// Observable state of the Search screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Results of the last nearby search.
    pub places: Vec<RemotePlace>,
    /// Live copy of the favourites table.
    pub favourites: Vec<FavouritePlace>,
    /// Last failure, formatted for display.
    pub error: Option<String>,
    /// Whether a search is in flight.
    pub loading: bool,
}

/// Change applied by [`SearchViewModel::toggle_favourite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavouriteToggle {
    /// The place was not a favourite and has been saved.
    Added,
    /// The place was a favourite and has been removed.
    Removed,
}

/// Callback run after every successful toggle.
pub type FavouriteListener = Arc<dyn Fn(FavouriteToggle) + Send + Sync>;

/// View-model behind the Search screen.
///
/// On construction it subscribes to the favourites table and keeps
/// [`SearchState::favourites`] current from a background task. The task is
/// aborted when the view-model is dropped.
pub struct SearchViewModel {
    store: Arc<dyn FavouritesStore>,
    places: Arc<dyn PlacesClient>,
    preferences: Arc<dyn PreferenceStore>,
    state: Arc<watch::Sender<SearchState>>,
    listener: Option<FavouriteListener>,
    observer: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SearchViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchViewModel")
            .field("state", &*self.state.borrow())
            .field("observing", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl SearchViewModel {
    /// Wire the view-model and start following the favourites table.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn new(
        store: Arc<dyn FavouritesStore>,
        places: Arc<dyn PlacesClient>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let (sender, _) = watch::channel(SearchState::default());
        let state = Arc::new(sender);

        let observer = match store.observe_all().await {
            Ok(mut subscription) => {
                let state = Arc::clone(&state);
                Some(tokio::spawn(async move {
                    while let Some(snapshot) = subscription.next_snapshot().await {
                        state.send_modify(|current| current.favourites = snapshot);
                    }
                }))
            }
            Err(err) => {
                error!("failed to observe favourite places: {err}");
                state.send_modify(|current| {
                    current.error = Some(format!("Failed to load favourite places: {err}"));
                });
                None
            }
        };

        Self {
            store,
            places,
            preferences,
            state,
            listener: None,
            observer,
        }
    }

    /// Run `listener` after every successful favourite toggle.
    #[must_use]
    pub fn with_favourite_listener(
        mut self,
        listener: impl Fn(FavouriteToggle) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Search for places within `radius_metres` of `location`.
    pub async fn fetch_nearby(
        &self,
        location: Option<DeviceLocation>,
        radius_metres: u32,
        api_key: &str,
    ) {
        let Some(origin) = location else {
            warn!("nearby search requested without a location");
            self.state
                .send_modify(|state| state.error = Some("Location is unavailable".to_owned()));
            return;
        };

        self.state.send_modify(|state| {
            state.places.clear();
            state.error = None;
            state.loading = true;
        });

        let outcome = self.places.fetch_nearby(origin, radius_metres, api_key).await;
        self.state.send_modify(|state| {
            state.loading = false;
            match outcome {
                Ok(places) => {
                    debug!("nearby search returned {} places", places.len());
                    if places.is_empty() {
                        state.error = Some("No places found".to_owned());
                    }
                    state.places = places;
                }
                Err(err) if err.is_api_failure() => {
                    error!("places API error: {err}");
                    state.error = Some(format!("Failed to retrieve places: {err}"));
                }
                Err(err) => {
                    error!("error fetching places: {err}");
                    state.error = Some(format!("Error: {err}"));
                }
            }
        });
    }

    /// Search around the saved location with the saved radius.
    pub async fn search_from_preferences(&self, api_key: &str) {
        match self.preferences.load() {
            Ok(prefs) => {
                self.fetch_nearby(prefs.last_location, prefs.search_radius, api_key)
                    .await;
            }
            Err(err) => {
                error!("failed to read search preferences: {err}");
                self.state.send_modify(|state| {
                    state.error = Some(format!("Failed to read preferences: {err}"));
                });
            }
        }
    }

    /// Save `place` as a favourite, or remove it if it already is one.
    ///
    /// Returns the change applied, or `None` when the store failed.
    pub async fn toggle_favourite(&self, place: &RemotePlace) -> Option<FavouriteToggle> {
        let favourite = place.to_favourite();
        match self.apply_toggle(&favourite).await {
            Ok(toggle) => {
                debug!("favourite {} {toggle:?}", favourite.id);
                if let Some(listener) = &self.listener {
                    listener(toggle);
                }
                Some(toggle)
            }
            Err(err) => {
                error!("failed to update favourite {}: {err}", favourite.id);
                self.state.send_modify(|state| {
                    state.error = Some(format!("Failed to update favourite: {err}"));
                });
                None
            }
        }
    }

    async fn apply_toggle(
        &self,
        favourite: &FavouritePlace,
    ) -> Result<FavouriteToggle, FavouritesStoreError> {
        if self.store.get_by_id(&favourite.id).await?.is_some() {
            self.store.delete(favourite).await?;
            Ok(FavouriteToggle::Removed)
        } else {
            self.store.insert(favourite).await?;
            Ok(FavouriteToggle::Added)
        }
    }

    /// Whether `id` is currently saved. Store failures count as "no".
    pub async fn is_favourite(&self, id: &PlaceId) -> bool {
        match self.store.get_by_id(id).await {
            Ok(found) => found.is_some(),
            Err(err) => {
                warn!("failed to look up favourite {id}: {err}");
                false
            }
        }
    }

    /// One-shot reload of the favourites list.
    pub async fn refresh_favourites(&self) {
        match self.store.get_all().await {
            Ok(favourites) => self.state.send_modify(|state| state.favourites = favourites),
            Err(err) => {
                error!("error refreshing favourite places: {err}");
                self.state.send_modify(|state| {
                    state.error = Some(format!("Failed to refresh favourite places: {err}"));
                });
            }
        }
    }
}

impl Drop for SearchViewModel {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.abort();
        }
    }
}
