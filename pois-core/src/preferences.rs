//! User preferences.
//!
//! Three independent scalars are kept under one namespace: the search radius
//! and the last known latitude and longitude. The two coordinates are read
//! and written together as an optional [`DeviceLocation`].

use thiserror::Error;

use crate::DeviceLocation;

/// Snapshot of every stored preference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Preferences {
    /// Nearby-search radius in metres. Defaults to `0`.
    pub search_radius: u32,
    /// Last location saved after a successful fix, if any.
    pub last_location: Option<DeviceLocation>,
}

/// Errors raised by a [`PreferenceStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferencesError {
    /// The backing storage could not be read.
    #[error("failed to read preferences from {location}: {message}")]
    Read {
        /// Where the preferences live.
        location: String,
        /// Underlying error description.
        message: String,
    },
    /// The backing storage could not be written.
    #[error("failed to write preferences to {location}: {message}")]
    Write {
        /// Where the preferences live.
        location: String,
        /// Underlying error description.
        message: String,
    },
    /// The stored payload was not understood.
    #[error("preferences at {location} are malformed: {message}")]
    Malformed {
        /// Where the preferences live.
        location: String,
        /// Decoder error description.
        message: String,
    },
}

/// Key-value preference storage.
///
/// Implementations persist each write immediately; there is no batching and
/// no migration of stored values.
pub trait PreferenceStore: Send + Sync {
    /// Read every preference, applying defaults for missing entries.
    fn load(&self) -> Result<Preferences, PreferencesError>;

    /// Persist the search radius.
    fn set_search_radius(&self, radius_metres: u32) -> Result<(), PreferencesError>;

    /// Persist the last known location.
    fn set_last_location(&self, location: DeviceLocation) -> Result<(), PreferencesError>;

    /// Read the search radius.
    fn search_radius(&self) -> Result<u32, PreferencesError> {
        self.load().map(|prefs| prefs.search_radius)
    }

    /// Read the last known location.
    fn last_location(&self) -> Result<Option<DeviceLocation>, PreferencesError> {
        self.load().map(|prefs| prefs.last_location)
    }
}
