//! Collaborators shared by the subcommands.

use std::sync::Arc;

use camino::Utf8PathBuf;
use pois_core::favourites::DATABASE_FILE;
use pois_core::{Geocoder, PlacesClient, SqliteFavouritesStore};
use pois_data::{FilePreferenceStore, HttpPlacesClient, NominatimGeocoder};

use crate::CliError;

/// Builds the network-backed collaborators for a command invocation.
pub(crate) trait ServiceBuilder {
    fn places(&self, base_url: &str) -> Result<Arc<dyn PlacesClient>, CliError>;
    fn geocoder(&self, base_url: &str) -> Result<Arc<dyn Geocoder>, CliError>;
}

pub(crate) struct DefaultServices;

impl ServiceBuilder for DefaultServices {
    fn places(&self, base_url: &str) -> Result<Arc<dyn PlacesClient>, CliError> {
        let client = HttpPlacesClient::new(base_url).map_err(|source| CliError::BuildClient {
            service: "places",
            url: base_url.to_owned(),
            source,
        })?;
        Ok(Arc::new(client))
    }

    fn geocoder(&self, base_url: &str) -> Result<Arc<dyn Geocoder>, CliError> {
        let geocoder =
            NominatimGeocoder::new(base_url).map_err(|source| CliError::BuildClient {
                service: "geocoder",
                url: base_url.to_owned(),
                source,
            })?;
        Ok(Arc::new(geocoder))
    }
}

/// Directory holding the favourites database and the preferences file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataDir {
    root: Utf8PathBuf,
}

impl DataDir {
    pub(crate) const fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub(crate) fn favourites(&self) -> Result<Arc<SqliteFavouritesStore>, CliError> {
        let path = self.root.join(DATABASE_FILE);
        log::debug!("opening favourites database at {path}");
        SqliteFavouritesStore::open(&path)
            .map(Arc::new)
            .map_err(|source| CliError::OpenFavourites { path, source })
    }

    pub(crate) fn preferences(&self) -> Arc<FilePreferenceStore> {
        Arc::new(FilePreferenceStore::in_dir(&self.root))
    }
}
