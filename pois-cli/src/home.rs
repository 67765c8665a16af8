//! `home` command: refresh or reload the device location and list favourites.

use std::{io::Write, sync::Arc};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pois_app::{HomeState, HomeViewModel};
use pois_core::{DeviceLocation, DeviceLocator, LocationPermission};
use pois_data::{ConfiguredLocationSource, DEFAULT_GEOCODER_URL};
use serde::{Deserialize, Serialize};

use crate::favourites::write_favourites;
use crate::services::{DataDir, ServiceBuilder};
use crate::{
    ARG_DATA_DIR, ARG_DENY_LOCATION, ARG_GEOCODER_URL, ARG_LATITUDE, ARG_LONGITUDE, CliError,
    ENV_HOME_LATITUDE, ENV_HOME_LONGITUDE, data_dir_or_default, runtime, screen_outcome,
    write_line,
};

/// CLI arguments for the `home` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Show the Home screen. With a device fix (or --deny-location) \
                 the location is refreshed, saved and reverse geocoded; \
                 otherwise the address of the saved location is looked up. \
                 The favourites list is printed afterwards.",
    about = "Show the current location and favourite places"
)]
#[ortho_config(prefix = "POIS")]
pub(crate) struct HomeArgs {
    /// Directory holding the favourites database and preferences.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Base URL of the Nominatim reverse geocoder.
    #[arg(long = ARG_GEOCODER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
    /// Latitude of the device fix in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the device fix in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Behave as if the user refused location access.
    #[arg(long = ARG_DENY_LOCATION)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) deny_location: bool,
}

impl HomeArgs {
    fn into_config(self) -> Result<HomeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HomeConfig::try_from(merged)
    }
}

/// Resolved `home` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HomeConfig {
    pub(crate) data_dir: Utf8PathBuf,
    pub(crate) geocoder_url: String,
    pub(crate) fix: Option<DeviceLocation>,
    pub(crate) deny_location: bool,
}

impl HomeConfig {
    /// A refresh is only meaningful when there is a fix or a refusal to report.
    const fn refreshes_location(&self) -> bool {
        self.deny_location || self.fix.is_some()
    }

    const fn location_source(&self) -> ConfiguredLocationSource {
        if self.deny_location {
            ConfiguredLocationSource::denied()
        } else {
            ConfiguredLocationSource::new(LocationPermission::Granted, self.fix)
        }
    }
}

impl TryFrom<HomeArgs> for HomeConfig {
    type Error = CliError;

    fn try_from(args: HomeArgs) -> Result<Self, Self::Error> {
        let fix = match (args.latitude, args.longitude) {
            (Some(latitude), Some(longitude)) => {
                Some(DeviceLocation::validated(latitude, longitude)?)
            }
            (Some(_), None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LONGITUDE,
                    env: ENV_HOME_LONGITUDE,
                });
            }
            (None, Some(_)) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LATITUDE,
                    env: ENV_HOME_LATITUDE,
                });
            }
            (None, None) => None,
        };

        Ok(Self {
            data_dir: data_dir_or_default(args.data_dir),
            geocoder_url: args
                .geocoder_url
                .unwrap_or_else(|| DEFAULT_GEOCODER_URL.to_owned()),
            fix,
            deny_location: args.deny_location,
        })
    }
}

pub(crate) fn run_home_with(
    args: HomeArgs,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_home(&config, services, writer)
}

pub(crate) fn execute_home(
    config: &HomeConfig,
    services: &dyn ServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let data = DataDir::new(config.data_dir.clone());
    let locator = DeviceLocator::new(
        Arc::new(config.location_source()),
        services.geocoder(&config.geocoder_url)?,
    );
    let view_model = HomeViewModel::new(data.favourites()?, locator, data.preferences());

    let state = runtime()?.block_on(async {
        if config.refreshes_location() {
            view_model.refresh_location().await;
        } else {
            view_model.load_saved_address().await;
        }
        view_model.refresh_favourites().await;
        view_model.state()
    });

    write_home(writer, &state)?;
    screen_outcome("home", state.error)
}

fn write_home(writer: &mut dyn Write, state: &HomeState) -> Result<(), CliError> {
    match state.location {
        Some(location) => write_line(writer, format_args!("location: {location}"))?,
        None => write_line(writer, format_args!("location: unknown"))?,
    }
    if let Some(address) = &state.address {
        write_line(
            writer,
            format_args!("address: {}, {}", address.street, address.locality),
        )?;
    }
    if let Some(message) = &state.message {
        write_line(writer, format_args!("{message}"))?;
    }
    write_favourites(writer, &state.favourites)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<HomeConfig, CliError> {
    let merged = HomeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    HomeConfig::try_from(merged)
}
