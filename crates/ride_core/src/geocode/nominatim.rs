//! Blocking HTTP adapter for the Nominatim geocoding API.
//!
//! This wraps the public `/search` and `/reverse` endpoints behind the
//! [`Geocoder`] port without leaking details of the HTTP response. Enabled
//! with the `nominatim` cargo feature; the engine itself only ever sees the
//! port.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::{Geocoder, LocationSuggestion, MAX_SUGGESTIONS};
use crate::error::GeocoderError;
use crate::geo::Coordinate;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
const USER_AGENT: &str = concat!("ride_core/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";

/// Thin HTTP client for Nominatim forward/reverse geocoding.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    endpoint: String,
}

impl NominatimClient {
    /// Create a client for the given endpoint (e.g. a self-hosted mirror).
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build geocoder client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, GeocoderError> {
        Url::parse(&format!("{}/{}", self.endpoint, path))
            .map_err(|err| GeocoderError::Payload(format!("failed to build geocoder URL: {err}")))
    }
}

impl Default for NominatimClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl Geocoder for NominatimClient {
    fn search(&self, query: &str) -> Result<Vec<LocationSuggestion>, GeocoderError> {
        let mut url = self.url("search")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", &MAX_SUGGESTIONS.to_string())
            .append_pair("addressdetails", "1");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| GeocoderError::Transport(err.to_string()))?;
        let places: Vec<NominatimPlace> = response
            .json()
            .map_err(|err| GeocoderError::Payload(err.to_string()))?;

        Ok(parse_search_response(places))
    }

    fn reverse(&self, lat: f64, lng: f64) -> Result<String, GeocoderError> {
        let mut url = self.url("reverse")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lng.to_string())
            .append_pair("addressdetails", "1");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| GeocoderError::Transport(err.to_string()))?;
        let parsed: NominatimReverseResponse = response
            .json()
            .map_err(|err| GeocoderError::Payload(err.to_string()))?;

        parse_reverse_response(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    /// Nominatim serializes coordinates as strings.
    lat: String,
    lon: String,
    place_id: u64,
}

#[derive(Debug, Deserialize)]
struct NominatimReverseResponse {
    display_name: Option<String>,
    error: Option<String>,
}

/// Convert raw places to suggestions, dropping entries whose coordinates do
/// not parse or fall outside valid ranges.
fn parse_search_response(places: Vec<NominatimPlace>) -> Vec<LocationSuggestion> {
    places
        .into_iter()
        .filter_map(|place| {
            let lat = place.lat.parse::<f64>().ok()?;
            let lng = place.lon.parse::<f64>().ok()?;
            let location = Coordinate::new(lat, lng).ok()?;
            Some(LocationSuggestion {
                display_name: place.display_name,
                location,
                place_id: place.place_id.to_string(),
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn parse_reverse_response(response: NominatimReverseResponse) -> Result<String, GeocoderError> {
    if let Some(error) = response.error {
        return Err(GeocoderError::Payload(error));
    }
    response.display_name.ok_or(GeocoderError::NoResult)
}
