//! Error types emitted by the POIs CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use pois_core::{FavouritesStoreError, InvalidCoordinates, SqliteFavouritesStoreError};
use pois_data::ClientBuildError;
use thiserror::Error;

/// Errors emitted by the POIs CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The configured device fix is not a valid coordinate.
    #[error("invalid device fix: {0}")]
    InvalidFix(#[from] InvalidCoordinates),
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Opening the favourites database failed.
    #[error("failed to open favourites database at {path:?}: {source}")]
    OpenFavourites {
        path: Utf8PathBuf,
        #[source]
        source: SqliteFavouritesStoreError,
    },
    /// A favourites operation issued directly by the CLI failed.
    #[error(transparent)]
    Favourites(#[from] FavouritesStoreError),
    /// Constructing an HTTP adapter failed.
    #[error("failed to build {service} client for {url:?}: {source}")]
    BuildClient {
        service: &'static str,
        url: String,
        #[source]
        source: ClientBuildError,
    },
    /// No favourite is stored under the requested identifier.
    #[error("no favourite place with id {id:?}")]
    UnknownFavourite { id: String },
    /// A `--favourite` index does not match any search result.
    #[error("search result {index} does not exist ({count} results)")]
    UnknownResult { index: usize, count: usize },
    /// Directions need a saved or current location.
    #[error("no saved location to route from; run `pois home` with a fix first")]
    NoOrigin,
    /// A screen finished with an error message in its state.
    #[error("{screen}: {message}")]
    Screen {
        screen: &'static str,
        message: String,
    },
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
