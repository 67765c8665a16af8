//! Data directories and stub services for CLI tests.

use super::*;
use camino::Utf8Path;
use pois_core::test_support::{StubGeocoder, StubPlacesClient, block_on};
use pois_core::{
    AddressCandidate, DeviceLocation, FavouritePlace, FavouritesStore, Geocoder, PlacesClient,
    PreferenceStore, RemotePlace, SqliteFavouritesStore,
};
use pois_data::FilePreferenceStore;
use std::sync::Arc;
use tempfile::TempDir;

pub(super) const BIRMINGHAM: DeviceLocation = DeviceLocation::new(33.5186, -86.8104);

/// Temporary data directory with helpers to seed its stores.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn preferences(&self) -> FilePreferenceStore {
        FilePreferenceStore::in_dir(&self.root)
    }

    pub(super) fn save_location(&self, location: DeviceLocation) {
        self.preferences()
            .set_last_location(location)
            .expect("save location");
    }

    pub(super) fn save_radius(&self, radius: u32) {
        self.preferences()
            .set_search_radius(radius)
            .expect("save radius");
    }

    pub(super) fn favourite(&self, place: &RemotePlace) {
        let store = self.open_store();
        block_on(store.insert(&place.to_favourite())).expect("insert favourite");
    }

    pub(super) fn favourites(&self) -> Vec<FavouritePlace> {
        let store = self.open_store();
        block_on(store.get_all()).expect("list favourites")
    }

    fn open_store(&self) -> SqliteFavouritesStore {
        SqliteFavouritesStore::open(self.root.join(pois_core::favourites::DATABASE_FILE))
            .expect("open favourites database")
    }
}

/// [`ServiceBuilder`] handing out scripted collaborators.
pub(super) struct StubServices {
    pub(super) places: Arc<StubPlacesClient>,
    pub(super) geocoder: Arc<StubGeocoder>,
}

impl StubServices {
    pub(super) fn with_places(places: Vec<RemotePlace>) -> Self {
        Self {
            places: Arc::new(StubPlacesClient::with_places(places)),
            ..Self::default()
        }
    }
}

impl Default for StubServices {
    fn default() -> Self {
        Self {
            places: Arc::new(StubPlacesClient::with_places(Vec::new())),
            geocoder: Arc::new(StubGeocoder::with_candidates(vec![birmingham_address()])),
        }
    }
}

impl ServiceBuilder for StubServices {
    fn places(&self, _base_url: &str) -> Result<Arc<dyn PlacesClient>, CliError> {
        let places: Arc<dyn PlacesClient> = self.places.clone();
        Ok(places)
    }

    fn geocoder(&self, _base_url: &str) -> Result<Arc<dyn Geocoder>, CliError> {
        let geocoder: Arc<dyn Geocoder> = self.geocoder.clone();
        Ok(geocoder)
    }
}

pub(super) fn birmingham_address() -> AddressCandidate {
    AddressCandidate {
        house_number: Some("1720".into()),
        road: Some("2nd Ave S".into()),
        city: Some("Birmingham".into()),
        state: Some("AL".into()),
        postcode: Some("35294".into()),
    }
}

/// Parse `line` as a `pois` invocation against `workspace` and run it.
pub(super) fn run_command_line(
    workspace: &Workspace,
    line: &str,
    services: &StubServices,
    output: &mut Vec<u8>,
) -> Result<(), CliError> {
    let mut argv = vec!["pois".to_owned()];
    argv.extend(line.split_whitespace().map(str::to_owned));
    argv.extend([format!("--{ARG_DATA_DIR}"), workspace.root().to_string()]);
    let cli = Cli::try_parse_from(argv)?;
    dispatch(cli.command, services, output)
}

pub(super) fn text(output: &[u8]) -> String {
    String::from_utf8(output.to_vec()).expect("output utf-8")
}
