//! Test helpers for common setup and geocoder doubles.
//!
//! This module provides shared fixtures to reduce duplication across test
//! files.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::GeocoderError;
use crate::geo::Coordinate;
use crate::geocode::simulated::SimulatedGeocoder;
use crate::geocode::{Geocoder, LocationSuggestion};
use crate::orchestrator::{OrchestratorParams, RideOrchestrator};
use crate::pricing::VehicleClass;
use crate::ride::{Address, RideRequest};

/// Standard fixture route: Connaught Place to Noida Sector 18 (~19.8 km).
pub const CONNAUGHT_PLACE: Coordinate = Coordinate { lat: 28.6139, lng: 77.2090 };
pub const NOIDA_SECTOR_18: Coordinate = Coordinate { lat: 28.5355, lng: 77.3910 };

pub fn delhi_pickup() -> Address {
    Address {
        location: CONNAUGHT_PLACE,
        label: "Connaught Place, New Delhi".to_string(),
    }
}

pub fn noida_dropoff() -> Address {
    Address {
        location: NOIDA_SECTOR_18,
        label: "Noida Sector 18".to_string(),
    }
}

pub fn delhi_ride_request(vehicle_class: VehicleClass) -> RideRequest {
    RideRequest {
        pickup: delhi_pickup(),
        dropoff: noida_dropoff(),
        vehicle_class,
    }
}

/// Orchestrator with default config, a fixed seed, and the simulated
/// geocoder.
pub fn test_orchestrator() -> RideOrchestrator {
    RideOrchestrator::with_params(OrchestratorParams::default())
}

/// Orchestrator with a custom geocoder double.
pub fn test_orchestrator_with_geocoder(geocoder: Box<dyn Geocoder>) -> RideOrchestrator {
    RideOrchestrator::with_params(OrchestratorParams {
        geocoder,
        ..OrchestratorParams::default()
    })
}

/// Geocoder double that always fails, for degradation tests.
pub struct FailingGeocoder;

impl Geocoder for FailingGeocoder {
    fn search(&self, _query: &str) -> Result<Vec<LocationSuggestion>, GeocoderError> {
        Err(GeocoderError::Transport("connection refused".to_string()))
    }

    fn reverse(&self, _lat: f64, _lng: f64) -> Result<String, GeocoderError> {
        Err(GeocoderError::Transport("connection refused".to_string()))
    }
}

/// Geocoder double that counts calls and delegates to the simulated
/// gazetteer. Clone the counters before boxing to read them afterwards.
pub struct CountingGeocoder {
    pub searches: Arc<AtomicUsize>,
    pub reverses: Arc<AtomicUsize>,
    inner: SimulatedGeocoder,
}

impl CountingGeocoder {
    pub fn new() -> Self {
        Self {
            searches: Arc::new(AtomicUsize::new(0)),
            reverses: Arc::new(AtomicUsize::new(0)),
            inner: SimulatedGeocoder::new(),
        }
    }
}

impl Default for CountingGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for CountingGeocoder {
    fn search(&self, query: &str) -> Result<Vec<LocationSuggestion>, GeocoderError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query)
    }

    fn reverse(&self, lat: f64, lng: f64) -> Result<String, GeocoderError> {
        self.reverses.fetch_add(1, Ordering::SeqCst);
        self.inner.reverse(lat, lng)
    }
}
