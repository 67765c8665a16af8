//! `settings` command: show or change the search radius.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pois_app::SettingsViewModel;
use serde::{Deserialize, Serialize};

use crate::services::DataDir;
use crate::{ARG_DATA_DIR, ARG_RADIUS, CliError, data_dir_or_default, screen_outcome, write_line};

/// CLI arguments for the `settings` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Show the search radius, or save a new one with --radius")]
#[ortho_config(prefix = "POIS")]
pub(crate) struct SettingsArgs {
    /// Directory holding the favourites database and preferences.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// New search radius in metres.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<u32>,
}

pub(crate) fn run_settings_with(args: SettingsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let data = DataDir::new(data_dir_or_default(merged.data_dir));
    let view_model = SettingsViewModel::new(data.preferences());
    if let Some(radius) = merged.radius {
        view_model.set_search_radius(radius);
    }

    let state = view_model.state();
    screen_outcome("settings", state.error)?;
    write_line(
        writer,
        format_args!("search radius: {} m", state.search_radius),
    )
}
