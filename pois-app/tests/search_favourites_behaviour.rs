//! Behavioural tests for `SearchViewModel` favourite toggling.

use std::{cell::RefCell, sync::Arc, time::Duration};

use pois_app::{FavouriteToggle, SearchViewModel};
use pois_core::{
    DeviceLocation, Preferences, SqliteFavouritesStore,
    test_support::{MemoryPreferenceStore, StubPlacesClient, remote_place},
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

const BIRMINGHAM: DeviceLocation = DeviceLocation::new(33.5186, -86.8104);

/// Shared state for search screen scenarios.
struct SearchWorld {
    runtime: Runtime,
    preferences: RefCell<Preferences>,
    client: RefCell<Option<Arc<StubPlacesClient>>>,
    view_model: RefCell<Option<SearchViewModel>>,
    last_toggle: RefCell<Option<FavouriteToggle>>,
}

impl SearchWorld {
    fn new() -> Self {
        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build runtime"),
            preferences: RefCell::new(Preferences::default()),
            client: RefCell::new(None),
            view_model: RefCell::new(None),
            last_toggle: RefCell::new(None),
        }
    }

    fn client(&self) -> Arc<StubPlacesClient> {
        self.client
            .borrow()
            .clone()
            .expect("places API should be configured")
    }

    /// Build the view-model on first use so every `Given` can run first.
    fn with_view_model<T>(&self, work: impl FnOnce(&SearchViewModel) -> T) -> T {
        if self.view_model.borrow().is_none() {
            let store = SqliteFavouritesStore::open_in_memory().expect("open store");
            let prefs = MemoryPreferenceStore::with_preferences(*self.preferences.borrow());
            let view_model = self.runtime.block_on(SearchViewModel::new(
                Arc::new(store),
                self.client(),
                Arc::new(prefs),
            ));
            self.view_model.replace(Some(view_model));
        }
        let borrowed = self.view_model.borrow();
        work(borrowed.as_ref().expect("view-model should exist"))
    }

    fn favourite_names(&self) -> Vec<String> {
        self.with_view_model(|vm| {
            self.runtime.block_on(async {
                // Give the observer task a chance to apply pending snapshots.
                tokio::time::sleep(Duration::from_millis(20)).await;
                vm.state()
                    .favourites
                    .into_iter()
                    .map(|place| place.name)
                    .collect()
            })
        })
    }
}

fn unquote(raw: &str) -> String {
    raw.trim().trim_matches('"').to_owned()
}

#[fixture]
fn world() -> SearchWorld {
    SearchWorld::new()
}

#[given("a search screen around Birmingham")]
fn given_birmingham(world: &SearchWorld) {
    world.preferences.replace(Preferences {
        search_radius: 1500,
        last_location: Some(BIRMINGHAM),
    });
}

#[given("a search screen with no saved location")]
fn given_no_location(world: &SearchWorld) {
    world.preferences.replace(Preferences {
        search_radius: 1500,
        last_location: None,
    });
}

#[given("the places API knows {first} and {second}")]
fn given_places(world: &SearchWorld, first: String, second: String) {
    let places = vec![remote_place(&unquote(&first)), remote_place(&unquote(&second))];
    world
        .client
        .replace(Some(Arc::new(StubPlacesClient::with_places(places))));
}

#[when("I search from my saved preferences")]
fn search(world: &SearchWorld) {
    world.with_view_model(|vm| world.runtime.block_on(vm.search_from_preferences("test-key")));
}

#[when("I toggle result {index}")]
fn toggle(world: &SearchWorld, index: usize) {
    let toggle = world.with_view_model(|vm| {
        let place = vm
            .state()
            .places
            .get(index - 1)
            .cloned()
            .expect("result index should exist");
        world.runtime.block_on(vm.toggle_favourite(&place))
    });
    world.last_toggle.replace(toggle);
}

#[then("the toggle reports {expected}")]
fn then_toggle(world: &SearchWorld, expected: String) {
    let expected = match unquote(&expected).as_str() {
        "Added" => FavouriteToggle::Added,
        "Removed" => FavouriteToggle::Removed,
        other => panic!("unknown toggle {other}"),
    };
    assert_eq!(*world.last_toggle.borrow(), Some(expected));
}

#[then("the favourites list shows {name}")]
fn then_list(world: &SearchWorld, name: String) {
    assert_eq!(world.favourite_names(), vec![unquote(&name)]);
}

#[then("the favourites list is empty")]
fn then_empty(world: &SearchWorld) {
    assert!(world.favourite_names().is_empty());
}

#[then("the screen shows the error {message}")]
fn then_error(world: &SearchWorld, message: String) {
    let error = world.with_view_model(|vm| vm.state().error);
    assert_eq!(error, Some(unquote(&message)));
}

#[then("no request reached the places API")]
fn then_no_request(world: &SearchWorld) {
    assert!(world.client().requests().is_empty());
}

#[scenario(path = "tests/features/search_favourites.feature", index = 0)]
fn favouriting_saves(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search_favourites.feature", index = 1)]
fn toggling_twice_removes(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search_favourites.feature", index = 2)]
fn search_without_location(world: SearchWorld) {
    let _ = world;
}
