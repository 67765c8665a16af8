use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DeviceLocation;

/// Primary key of a favourite place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlaceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A place returned by a nearby search.
///
/// Values are rebuilt from every API response and are never persisted
/// directly; [`RemotePlace::to_favourite`] produces the stored form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePlace {
    /// Identifier assigned by the places API, when the response carries one.
    pub place_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Short address text supplied by the API.
    pub vicinity: String,
    /// Position of the place.
    pub location: DeviceLocation,
    /// Opaque photo tokens in API order.
    pub photo_references: Vec<String>,
    /// Display URL built from the first photo reference.
    pub photo_url: Option<String>,
}

impl RemotePlace {
    /// Key under which this place is stored when favourited.
    ///
    /// Uses the API place identifier when present and non-empty, otherwise
    /// the display name. Two unrelated places sharing a name collide only on
    /// the fallback path.
    ///
    /// # Examples
    /// ```
    /// use pois_core::{DeviceLocation, PlaceId, RemotePlace};
    ///
    /// let mut place = RemotePlace {
    ///     place_id: None,
    ///     name: "Vulcan Park".into(),
    ///     vicinity: String::new(),
    ///     location: DeviceLocation::new(33.49, -86.79),
    ///     photo_references: Vec::new(),
    ///     photo_url: None,
    /// };
    /// assert_eq!(place.favourite_id(), PlaceId::from("Vulcan Park"));
    ///
    /// place.place_id = Some("ChIJ123".into());
    /// assert_eq!(place.favourite_id(), PlaceId::from("ChIJ123"));
    /// ```
    #[must_use]
    pub fn favourite_id(&self) -> PlaceId {
        match self.place_id.as_deref() {
            Some(id) if !id.trim().is_empty() => PlaceId::new(id),
            _ => PlaceId::new(self.name.as_str()),
        }
    }

    /// Map this search result onto its persisted favourite form.
    #[must_use]
    pub fn to_favourite(&self) -> FavouritePlace {
        FavouritePlace {
            id: self.favourite_id(),
            name: self.name.clone(),
            vicinity: self.vicinity.clone(),
            location: self.location,
            photo_url: self.photo_url.clone(),
        }
    }
}

/// A place bookmarked by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavouritePlace {
    /// Unique key within the favourites table.
    pub id: PlaceId,
    /// Display name.
    pub name: String,
    /// Short address text.
    pub vicinity: String,
    /// Position of the place.
    pub location: DeviceLocation,
    /// Optional display URL for a thumbnail.
    pub photo_url: Option<String>,
}
