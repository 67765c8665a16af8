//! Command-line front end for the POIs client.
//!
//! Each subcommand drives one screen's view-model against the on-disk
//! stores in a data directory and prints the resulting state as text.
#![forbid(unsafe_code)]

use std::{fmt, io::Write};

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

mod error;
mod favourites;
mod home;
mod search;
mod services;
mod settings;

pub use error::CliError;

use favourites::{DirectionsArgs, FavouritesArgs, UnfavouriteArgs};
use home::HomeArgs;
use search::SearchArgs;
use services::{DefaultServices, ServiceBuilder};
use settings::SettingsArgs;

pub(crate) const ARG_DATA_DIR: &str = "data-dir";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_PLACES_URL: &str = "places-url";
pub(crate) const ARG_GEOCODER_URL: &str = "geocoder-url";
pub(crate) const ARG_LATITUDE: &str = "latitude";
pub(crate) const ARG_LONGITUDE: &str = "longitude";
pub(crate) const ARG_DENY_LOCATION: &str = "deny-location";
pub(crate) const ARG_FAVOURITE: &str = "favourite";
pub(crate) const ARG_RADIUS: &str = "radius";
pub(crate) const ARG_ID: &str = "id";
pub(crate) const ENV_SEARCH_API_KEY: &str = "POIS_CMDS_SEARCH_API_KEY";
pub(crate) const ENV_HOME_LATITUDE: &str = "POIS_CMDS_HOME_LATITUDE";
pub(crate) const ENV_HOME_LONGITUDE: &str = "POIS_CMDS_HOME_LONGITUDE";
pub(crate) const ENV_UNFAVOURITE_ID: &str = "POIS_CMDS_UNFAVOURITE_ID";
pub(crate) const ENV_DIRECTIONS_ID: &str = "POIS_CMDS_DIRECTIONS_ID";

/// Run the POIs CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &DefaultServices, &mut stdout)
}

fn dispatch(
    command: Command,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Home(args) => home::run_home_with(args, services, writer),
        Command::Search(args) => search::run_search_with(args, services, writer),
        Command::Favourites(args) => favourites::run_favourites_with(args, writer),
        Command::Unfavourite(args) => favourites::run_unfavourite_with(args, services, writer),
        Command::Directions(args) => favourites::run_directions_with(args, services, writer),
        Command::Settings(args) => settings::run_settings_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pois",
    about = "Find nearby points of interest and keep a list of favourites",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh the device location and list favourite places.
    Home(HomeArgs),
    /// Search around the saved location and toggle favourites.
    Search(SearchArgs),
    /// List favourite places.
    Favourites(FavouritesArgs),
    /// Remove a favourite place.
    Unfavourite(UnfavouriteArgs),
    /// Print a navigation link to a favourite place.
    Directions(DirectionsArgs),
    /// Show or change the search radius.
    Settings(SettingsArgs),
}

fn data_dir_or_default(data_dir: Option<Utf8PathBuf>) -> Utf8PathBuf {
    data_dir.unwrap_or_else(|| Utf8PathBuf::from("."))
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

fn write_line(writer: &mut dyn Write, line: fmt::Arguments<'_>) -> Result<(), CliError> {
    writer
        .write_fmt(line)
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}

/// Turn an error left in a screen's state into a command failure.
fn screen_outcome(screen: &'static str, error: Option<String>) -> Result<(), CliError> {
    error.map_or(Ok(()), |message| Err(CliError::Screen { screen, message }))
}

#[cfg(test)]
mod tests;
