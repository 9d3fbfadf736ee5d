//! Error taxonomy for the booking engine.
//!
//! State-machine violations are hard failures surfaced to the caller;
//! geocoder failures are recovered locally with degraded fallbacks and never
//! propagate out of the search flow.

use thiserror::Error;

use crate::pricing::VehicleClass;
use crate::ride::{RideId, RideStatus};

/// Errors surfaced by the ride API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    /// The state machine rejected an out-of-order or disallowed status
    /// change (e.g. cancelling a ride that is already on trip).
    #[error("illegal ride transition: {from} -> {to}")]
    IllegalTransition { from: RideStatus, to: RideStatus },

    /// No fare could be computed for this vehicle class. Isolated per
    /// class; sibling estimates are unaffected.
    #[error("no fare estimate available for vehicle class {class}")]
    EstimateUnavailable { class: VehicleClass },

    /// A latitude/longitude pair outside the valid degree ranges.
    #[error("coordinate out of range: ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// The ride identifier is not known to the orchestrator.
    #[error("unknown ride: {0}")]
    UnknownRide(RideId),
}

/// Errors from a [`crate::geocode::Geocoder`] implementation.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// The request never produced a usable response (network, timeout).
    #[error("geocoder transport failed: {0}")]
    Transport(String),

    /// The response arrived but could not be interpreted.
    #[error("geocoder returned a malformed payload: {0}")]
    Payload(String),

    /// The lookup succeeded but matched nothing.
    #[error("no result for the given input")]
    NoResult,
}
