//! View-models for the POIs client screens.
//!
//! Each view-model owns its screen state in a [`tokio::sync::watch`] channel.
//! Presentation code reads a snapshot with `state()` or follows changes with
//! `subscribe()`. Operations never return errors: failures are logged and
//! stored as display text in the state's `error` field.

#![forbid(unsafe_code)]

mod directions;
mod home;
mod search;
mod settings;

pub use directions::directions_url;
pub use home::{HomeState, HomeViewModel};
pub use search::{FavouriteListener, FavouriteToggle, SearchState, SearchViewModel};
pub use settings::{SettingsState, SettingsViewModel};
