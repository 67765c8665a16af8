//! Nearby search over HTTP.
//!
//! [`HttpPlacesClient`] implements [`pois_core::PlacesClient`] against the
//! Google Places nearby-search endpoint.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pois_core::{DeviceLocation, PlacesClient};
//! use pois_data::places::{HttpPlacesClient, HttpPlacesClientConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpPlacesClientConfig::default().with_timeout(Duration::from_secs(10));
//! let client = HttpPlacesClient::with_config(config)?;
//! let places = client
//!     .fetch_nearby(DeviceLocation::new(33.5, -86.8), 1500, "api-key")
//!     .await?;
//! println!("{} places nearby", places.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod google;

pub use client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpPlacesClient, HttpPlacesClientConfig};
