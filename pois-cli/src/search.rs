//! `search` command: nearby search from saved preferences.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pois_app::{FavouriteToggle, SearchViewModel};
use pois_core::RemotePlace;
use pois_data::places::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};

use crate::services::{DataDir, ServiceBuilder};
use crate::{
    ARG_API_KEY, ARG_DATA_DIR, ARG_FAVOURITE, ARG_PLACES_URL, CliError, ENV_SEARCH_API_KEY,
    data_dir_or_default, runtime, screen_outcome, write_line,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Search for places around the saved location using the saved \
                 radius. Results are numbered from 1; pass --favourite with a \
                 result number to add or remove that place from favourites.",
    about = "Search for nearby places"
)]
#[ortho_config(prefix = "POIS")]
pub(crate) struct SearchArgs {
    /// Directory holding the favourites database and preferences.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Places API key.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the Places API.
    #[arg(long = ARG_PLACES_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) places_url: Option<String>,
    /// Toggle the favourite state of result `index` (repeatable).
    #[arg(long = ARG_FAVOURITE, value_name = "index")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) favourite: Vec<usize>,
}

impl SearchArgs {
    fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchConfig {
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) api_key: String,
    pub(crate) places_url: String,
    /// One-based result numbers to toggle, in order.
    pub(crate) toggles: Vec<usize>,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let api_key = args.api_key.ok_or(CliError::MissingArgument {
            field: ARG_API_KEY,
            env: ENV_SEARCH_API_KEY,
        })?;
        Ok(Self {
            data_dir: data_dir_or_default(args.data_dir),
            api_key,
            places_url: args
                .places_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            toggles: args.favourite,
        })
    }
}

/// One line of search output.
#[derive(Debug)]
struct ResultRow {
    place: RemotePlace,
    favourite: bool,
}

pub(crate) fn run_search_with(
    args: SearchArgs,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_search(&config, services, writer)
}

pub(crate) fn execute_search(
    config: &SearchConfig,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let data = DataDir::new(config.data_dir.clone());
    let store = data.favourites()?;
    let places = services.places(&config.places_url)?;
    let preferences = data.preferences();

    let (changes, rows) = runtime()?.block_on(async {
        let view_model = SearchViewModel::new(store, places, preferences).await;
        view_model.search_from_preferences(&config.api_key).await;
        let state = view_model.state();
        screen_outcome("search", state.error)?;

        let mut changes = Vec::with_capacity(config.toggles.len());
        for &index in &config.toggles {
            let place = index
                .checked_sub(1)
                .and_then(|offset| state.places.get(offset))
                .ok_or(CliError::UnknownResult {
                    index,
                    count: state.places.len(),
                })?;
            let Some(toggle) = view_model.toggle_favourite(place).await else {
                return Err(CliError::Screen {
                    screen: "search",
                    message: view_model.state().error.unwrap_or_default(),
                });
            };
            changes.push((place.name.clone(), toggle));
        }

        let mut rows = Vec::with_capacity(state.places.len());
        for place in state.places {
            let favourite = view_model.is_favourite(&place.favourite_id()).await;
            rows.push(ResultRow { place, favourite });
        }
        Ok::<_, CliError>((changes, rows))
    })?;

    for (name, toggle) in &changes {
        match toggle {
            FavouriteToggle::Added => write_line(writer, format_args!("added {name}"))?,
            FavouriteToggle::Removed => write_line(writer, format_args!("removed {name}"))?,
        }
    }
    write_results(writer, &rows)
}

fn write_results(writer: &mut dyn Write, rows: &[ResultRow]) -> Result<(), CliError> {
    for (number, row) in (1..).zip(rows) {
        let marker = if row.favourite { '*' } else { ' ' };
        write_line(
            writer,
            format_args!(
                "{number:>3}. {marker} {}\t{}",
                row.place.name, row.place.vicinity
            ),
        )?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
