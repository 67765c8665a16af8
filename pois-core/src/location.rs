use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single reading of the device's position.
///
/// Coordinates are WGS84 degrees. An absent location is modelled as
/// `Option<DeviceLocation>`; there is no "unset" coordinate value.
///
/// # Examples
/// ```
/// use pois_core::DeviceLocation;
///
/// let here = DeviceLocation::new(33.5, -86.8);
/// assert_eq!(here.to_string(), "33.5,-86.8");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Error returned by [`DeviceLocation::validated`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinates ({latitude}, {longitude}) are outside the WGS84 range")]
pub struct InvalidCoordinates {
    /// Rejected latitude.
    pub latitude: f64,
    /// Rejected longitude.
    pub longitude: f64,
}

impl DeviceLocation {
    /// Construct a location without range checks.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Construct a location, rejecting non-finite or out-of-range values.
    ///
    /// # Examples
    /// ```
    /// use pois_core::DeviceLocation;
    ///
    /// assert!(DeviceLocation::validated(91.0, 0.0).is_err());
    /// assert!(DeviceLocation::validated(0.0, 0.0).is_ok());
    /// ```
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if in_range {
            Ok(Self::new(latitude, longitude))
        } else {
            Err(InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }
}

impl fmt::Display for DeviceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Human-readable address produced by reverse geocoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAddress {
    /// House number and street, e.g. `"1720 2nd Ave S"`.
    pub street: String,
    /// City, state and postal code joined with `", "`.
    pub locality: String,
}

impl DeviceAddress {
    /// Assemble an address from individual components, skipping empty parts.
    ///
    /// # Examples
    /// ```
    /// use pois_core::DeviceAddress;
    ///
    /// let address = DeviceAddress::from_parts(
    ///     [Some("1720"), Some("2nd Ave S")],
    ///     [Some("Birmingham"), None, Some("35294")],
    /// );
    /// assert_eq!(address.street, "1720 2nd Ave S");
    /// assert_eq!(address.locality, "Birmingham, 35294");
    /// ```
    #[must_use]
    pub fn from_parts<'a>(
        street: impl IntoIterator<Item = Option<&'a str>>,
        locality: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Self {
        Self {
            street: join_present(street, " "),
            locality: join_present(locality, ", "),
        }
    }
}

fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, separator: &str) -> String {
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.street, self.locality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(DeviceLocation::validated(latitude, longitude).is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(0.0, -180.5)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_out_of_range_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(DeviceLocation::validated(latitude, longitude).is_err());
    }

    #[rstest]
    fn display_uses_query_format() {
        let location = DeviceLocation::new(-33.8670522, 151.1957362);
        assert_eq!(location.to_string(), "-33.8670522,151.1957362");
    }

    #[rstest]
    fn address_skips_blank_components() {
        let address =
            DeviceAddress::from_parts([None, Some("Main St")], [Some(" "), Some("AL"), None]);
        assert_eq!(address.street, "Main St");
        assert_eq!(address.locality, "AL");
    }
}
