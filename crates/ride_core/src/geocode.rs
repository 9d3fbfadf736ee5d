//! Geocoder port: forward search and reverse lookup.
//!
//! The engine consumes this contract but does not depend on any particular
//! provider. [`simulated::SimulatedGeocoder`] is the deterministic
//! in-process implementation; the `nominatim` feature adds an HTTP adapter
//! for the public Nominatim API.

pub mod simulated;

#[cfg(feature = "nominatim")]
pub mod nominatim;

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::error::GeocoderError;
use crate::geo::Coordinate;

/// Upper bound on returned suggestions per query.
pub const MAX_SUGGESTIONS: usize = 5;

/// One ranked hit for a free-text query. Ephemeral: produced per search,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSuggestion {
    pub display_name: String,
    pub location: Coordinate,
    pub place_id: String,
}

/// External geocoding collaborator. An empty search result is a valid,
/// non-error outcome; callers degrade gracefully on `Err` (empty
/// suggestions, or [`format_coordinate`] for reverse lookups).
pub trait Geocoder: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<LocationSuggestion>, GeocoderError>;

    fn reverse(&self, lat: f64, lng: f64) -> Result<String, GeocoderError>;
}

#[derive(Resource)]
pub struct GeocoderResource(pub Box<dyn Geocoder>);

/// Fallback label used when reverse geocoding fails.
pub fn format_coordinate(lat: f64, lng: f64) -> String {
    format!("{lat:.4}, {lng:.4}")
}
