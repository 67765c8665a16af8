//! Navigation links from a saved origin to a favourite place.

use pois_core::DeviceLocation;

const DIRECTIONS_ENDPOINT: &str = "https://www.google.com/maps/dir/";

/// Google Maps link that starts turn-by-turn navigation.
///
/// # Examples
/// ```
/// use pois_app::directions_url;
/// use pois_core::DeviceLocation;
///
/// let url = directions_url(DeviceLocation::new(1.5, 2.0), DeviceLocation::new(3.0, -4.25));
/// assert_eq!(
///     url,
///     "https://www.google.com/maps/dir/?api=1&origin=1.5,2&destination=3,-4.25&dir_action=navigate"
/// );
/// ```
#[must_use]
pub fn directions_url(origin: DeviceLocation, destination: DeviceLocation) -> String {
    format!("{DIRECTIONS_ENDPOINT}?api=1&origin={origin}&destination={destination}&dir_action=navigate")
}
