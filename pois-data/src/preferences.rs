//! Preferences persisted as a small JSON document.
//!
//! The file holds three keys: `search_radius` (integer metres) and
//! `search_latitude`/`search_longitude` (decimal strings, absent when no
//! location has been saved). Every write replaces the file atomically by
//! writing a sibling temporary file and renaming it over the target.

use std::io;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use pois_core::{DeviceLocation, PreferenceStore, Preferences, PreferencesError};
use serde::{Deserialize, Serialize};

use crate::fs::{ensure_parent_dir, open_parent};

/// File name used inside the data directory.
pub const PREFERENCES_FILE: &str = "pois_prefs.json";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct PreferencesDocument {
    #[serde(default)]
    search_radius: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_longitude: Option<String>,
}

/// [`PreferenceStore`] backed by a JSON file.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: Utf8PathBuf,
    // Serialises read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    /// Store preferences at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store preferences in [`PREFERENCES_FILE`] under `dir`.
    #[must_use]
    pub fn in_dir(dir: &Utf8Path) -> Self {
        Self::new(dir.join(PREFERENCES_FILE))
    }

    /// Location of the preferences file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn read_error(&self, err: &impl ToString) -> PreferencesError {
        PreferencesError::Read {
            location: self.path.to_string(),
            message: err.to_string(),
        }
    }

    fn write_error(&self, err: &impl ToString) -> PreferencesError {
        PreferencesError::Write {
            location: self.path.to_string(),
            message: err.to_string(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> PreferencesError {
        PreferencesError::Malformed {
            location: self.path.to_string(),
            message: message.into(),
        }
    }

    fn read_document(&self) -> Result<PreferencesDocument, PreferencesError> {
        let contents = match open_parent(&self.path)
            .and_then(|(dir, name)| dir.read_to_string(name.as_str()))
        {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(PreferencesDocument::default());
            }
            Err(err) => return Err(self.read_error(&err)),
        };
        serde_json::from_str(&contents).map_err(|err| self.malformed(err.to_string()))
    }

    fn write_document(&self, document: &PreferencesDocument) -> Result<(), PreferencesError> {
        let payload =
            serde_json::to_vec_pretty(document).map_err(|err| self.write_error(&err))?;
        ensure_parent_dir(&self.path).map_err(|err| self.write_error(&err))?;
        let (dir, name) = open_parent(&self.path).map_err(|err| self.write_error(&err))?;
        let staging = format!(".{name}.tmp");
        dir.write(staging.as_str(), &payload)
            .and_then(|()| dir.rename(staging.as_str(), &dir, name.as_str()))
            .map_err(|err| self.write_error(&err))?;
        debug!("saved preferences to {}", self.path);
        Ok(())
    }

    fn update(
        &self,
        change: impl FnOnce(&mut PreferencesDocument),
    ) -> Result<(), PreferencesError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut document = self.read_document()?;
        change(&mut document);
        self.write_document(&document)
    }

    fn parse_coordinate(&self, key: &str, raw: &str) -> Result<f64, PreferencesError> {
        raw.trim()
            .parse()
            .map_err(|err| self.malformed(format!("{key} '{raw}': {err}")))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Preferences, PreferencesError> {
        let document = self.read_document()?;
        let last_location = match (&document.search_latitude, &document.search_longitude) {
            (Some(lat), Some(lng)) => Some(DeviceLocation::new(
                self.parse_coordinate("search_latitude", lat)?,
                self.parse_coordinate("search_longitude", lng)?,
            )),
            _ => None,
        };
        Ok(Preferences {
            search_radius: document.search_radius,
            last_location,
        })
    }

    fn set_search_radius(&self, radius_metres: u32) -> Result<(), PreferencesError> {
        self.update(|document| document.search_radius = radius_metres)
    }

    fn set_last_location(&self, location: DeviceLocation) -> Result<(), PreferencesError> {
        self.update(|document| {
            document.search_latitude = Some(location.latitude.to_string());
            document.search_longitude = Some(location.longitude.to_string());
        })
    }
}
