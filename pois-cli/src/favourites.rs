//! `favourites`, `unfavourite` and `directions` commands.

use std::{io::Write, sync::Arc};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pois_app::HomeViewModel;
use pois_core::{DeviceLocator, FavouritePlace, FavouritesStore, PlaceId, SqliteFavouritesStore};
use pois_data::{ConfiguredLocationSource, DEFAULT_GEOCODER_URL};
use serde::{Deserialize, Serialize};

use crate::services::{DataDir, ServiceBuilder};
use crate::{
    ARG_DATA_DIR, ARG_ID, CliError, ENV_DIRECTIONS_ID, ENV_UNFAVOURITE_ID, data_dir_or_default,
    runtime, screen_outcome, write_line,
};

/// CLI arguments for the `favourites` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List favourite places in the order they were saved")]
#[ortho_config(prefix = "POIS")]
pub(crate) struct FavouritesArgs {
    /// Directory holding the favourites database and preferences.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
}

/// CLI arguments for the `unfavourite` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Remove a place from the favourites list")]
#[ortho_config(prefix = "POIS")]
pub(crate) struct UnfavouriteArgs {
    /// Identifier of the favourite, as printed by `pois favourites`.
    #[arg(value_name = ARG_ID)]
    #[serde(default)]
    pub(crate) id: Option<String>,
    /// Directory holding the favourites database and preferences.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
}

/// CLI arguments for the `directions` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print a Google Maps navigation link from the saved device \
                 location to a favourite place.",
    about = "Print directions to a favourite place"
)]
#[ortho_config(prefix = "POIS")]
pub(crate) struct DirectionsArgs {
    /// Identifier of the favourite, as printed by `pois favourites`.
    #[arg(value_name = ARG_ID)]
    #[serde(default)]
    pub(crate) id: Option<String>,
    /// Directory holding the favourites database and preferences.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
}

/// A favourite addressed by identifier inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FavouriteTarget {
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) id: PlaceId,
}

impl TryFrom<UnfavouriteArgs> for FavouriteTarget {
    type Error = CliError;

    fn try_from(args: UnfavouriteArgs) -> Result<Self, Self::Error> {
        let id = args.id.ok_or(CliError::MissingArgument {
            field: ARG_ID,
            env: ENV_UNFAVOURITE_ID,
        })?;
        Ok(Self {
            data_dir: data_dir_or_default(args.data_dir),
            id: PlaceId::new(id),
        })
    }
}

impl TryFrom<DirectionsArgs> for FavouriteTarget {
    type Error = CliError;

    fn try_from(args: DirectionsArgs) -> Result<Self, Self::Error> {
        let id = args.id.ok_or(CliError::MissingArgument {
            field: ARG_ID,
            env: ENV_DIRECTIONS_ID,
        })?;
        Ok(Self {
            data_dir: data_dir_or_default(args.data_dir),
            id: PlaceId::new(id),
        })
    }
}

pub(crate) fn run_favourites_with(
    args: FavouritesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let data = DataDir::new(data_dir_or_default(merged.data_dir));
    let store = data.favourites()?;
    let favourites = runtime()?.block_on(store.get_all())?;
    write_favourites(writer, &favourites)
}

pub(crate) fn run_unfavourite_with(
    args: UnfavouriteArgs,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    execute_unfavourite(&FavouriteTarget::try_from(merged)?, services, writer)
}

pub(crate) fn execute_unfavourite(
    target: &FavouriteTarget,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let data = DataDir::new(target.data_dir.clone());
    let store = data.favourites()?;
    let view_model = home_view_model(&data, Arc::<SqliteFavouritesStore>::clone(&store), services)?;

    let state = runtime()?.block_on(async {
        let place = find_favourite(store.as_ref(), &target.id).await?;
        view_model.unfavourite(&place).await;
        Ok::<_, CliError>(view_model.state())
    })?;

    screen_outcome("unfavourite", state.error)?;
    write_line(writer, format_args!("removed {}", target.id))?;
    write_favourites(writer, &state.favourites)
}

pub(crate) fn run_directions_with(
    args: DirectionsArgs,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    execute_directions(&FavouriteTarget::try_from(merged)?, services, writer)
}

pub(crate) fn execute_directions(
    target: &FavouriteTarget,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let data = DataDir::new(target.data_dir.clone());
    let store = data.favourites()?;
    let view_model = home_view_model(&data, Arc::<SqliteFavouritesStore>::clone(&store), services)?;

    let place = runtime()?.block_on(find_favourite(store.as_ref(), &target.id))?;
    let url = view_model
        .directions_url(&place)
        .ok_or(CliError::NoOrigin)?;
    write_line(writer, format_args!("{url}"))
}

/// Home view-model for commands that never consult the device location.
fn home_view_model(
    data: &DataDir,
    store: Arc<dyn FavouritesStore>,
    services: &dyn ServiceBuilder,
) -> Result<HomeViewModel, CliError> {
    let locator = DeviceLocator::new(
        Arc::new(ConfiguredLocationSource::denied()),
        services.geocoder(DEFAULT_GEOCODER_URL)?,
    );
    Ok(HomeViewModel::new(store, locator, data.preferences()))
}

async fn find_favourite(
    store: &dyn FavouritesStore,
    id: &PlaceId,
) -> Result<FavouritePlace, CliError> {
    store
        .get_by_id(id)
        .await?
        .ok_or_else(|| CliError::UnknownFavourite { id: id.to_string() })
}

pub(crate) fn write_favourites(
    writer: &mut dyn Write,
    favourites: &[FavouritePlace],
) -> Result<(), CliError> {
    if favourites.is_empty() {
        return write_line(writer, format_args!("no favourite places"));
    }
    write_line(writer, format_args!("favourite places:"))?;
    for place in favourites {
        write_line(
            writer,
            format_args!("  {}\t{}\t{}", place.id, place.name, place.vicinity),
        )?;
    }
    Ok(())
}
