//! Response types for the Google Places nearby-search endpoint.
//!
//! Every field is optional on the wire. Defaults are applied when the
//! response is converted, not during deserialisation, so a `null` is treated
//! the same as an absent key.
//!
//! See: <https://developers.google.com/maps/documentation/places/web-service/search-nearby>

use serde::Deserialize;

/// Statuses that carry a usable `results` array.
const SUCCESS_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

/// Nearby-search response body.
#[derive(Debug, Default, Deserialize)]
pub struct NearbySearchResponse {
    /// Request status, e.g. `"OK"`, `"ZERO_RESULTS"` or `"REQUEST_DENIED"`.
    pub status: Option<String>,

    /// Explanation supplied with a failing status.
    pub error_message: Option<String>,

    /// Matching places.
    pub results: Option<Vec<PlaceResult>>,
}

impl NearbySearchResponse {
    /// Whether the status allows the results to be used.
    ///
    /// A body without a status is accepted.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status
            .as_deref()
            .is_none_or(|status| SUCCESS_STATUSES.contains(&status))
    }
}

/// One entry of the `results` array.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceResult {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub vicinity: Option<String>,
    pub geometry: Option<Geometry>,
    pub photos: Option<Vec<Photo>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LatLng {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Photo {
    pub photo_reference: Option<String>,
}

impl PlaceResult {
    /// Coordinates from `geometry.location`, when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let location = self.geometry.as_ref()?.location.as_ref()?;
        Some((location.lat?, location.lng?))
    }

    /// Photo references in response order, skipping entries without one.
    #[must_use]
    pub fn photo_references(&self) -> Vec<String> {
        self.photos
            .iter()
            .flatten()
            .filter_map(|photo| photo.photo_reference.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn deserialise_full_result() {
        let json = r#"{
            "status": "OK",
            "results": [{
                "place_id": "ChIJ1",
                "name": "Vulcan Park",
                "vicinity": "1701 Valley View Dr",
                "geometry": { "location": { "lat": 33.4917, "lng": -86.7956 } },
                "photos": [{ "photo_reference": "ref-a" }, { "photo_reference": "ref-b" }]
            }]
        }"#;

        let response: NearbySearchResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        let results = response.results.expect("results");
        assert_eq!(results[0].coordinates(), Some((33.4917, -86.7956)));
        assert_eq!(results[0].photo_references(), vec!["ref-a", "ref-b"]);
    }

    #[test]
    fn deserialise_sparse_result() {
        let json = r#"{ "results": [{ "name": null, "geometry": { "location": { "lat": 1.0 } } }] }"#;

        let response: NearbySearchResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        let results = response.results.expect("results");
        assert_eq!(results[0].name, None);
        assert_eq!(results[0].coordinates(), None);
        assert!(results[0].photo_references().is_empty());
    }

    #[rstest]
    #[case(Some("OK"), true)]
    #[case(Some("ZERO_RESULTS"), true)]
    #[case(None, true)]
    #[case(Some("REQUEST_DENIED"), false)]
    #[case(Some("OVER_QUERY_LIMIT"), false)]
    fn status_classification(#[case] status: Option<&str>, #[case] expected: bool) {
        let response = NearbySearchResponse {
            status: status.map(str::to_owned),
            ..NearbySearchResponse::default()
        };
        assert_eq!(response.is_ok(), expected);
    }
}
