//! Ride domain model: the lifecycle state machine, identifiers, and the
//! components a booking is made of.
//!
//! [`RideStatus`] is the single source of truth for what can happen next.
//! Every mutation path — simulated dispatch, rider cancellation — goes
//! through [`RideStatus::transition_to`]; an out-of-order change is rejected
//! with [`BookingError::IllegalTransition`], never applied.

use std::fmt;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::geo::Coordinate;
use crate::pricing::{FareEstimate, VehicleClass};

/// Lifecycle: `requested -> assigned -> accepted -> on_trip -> completed`,
/// with `cancelled` reachable from any pre-trip state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Requested,
    Assigned,
    Accepted,
    OnTrip,
    Completed,
    Cancelled,
}

impl RideStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// Rider-initiated cancellation is legal only while no trip is underway.
    pub fn can_cancel(self) -> bool {
        matches!(
            self,
            RideStatus::Requested | RideStatus::Assigned | RideStatus::Accepted
        )
    }

    pub fn can_transition_to(self, next: RideStatus) -> bool {
        match (self, next) {
            (RideStatus::Requested, RideStatus::Assigned)
            | (RideStatus::Assigned, RideStatus::Accepted)
            | (RideStatus::Accepted, RideStatus::OnTrip)
            | (RideStatus::OnTrip, RideStatus::Completed) => true,
            (from, RideStatus::Cancelled) => from.can_cancel(),
            _ => false,
        }
    }

    /// Apply a transition, rejecting anything the table above disallows.
    pub fn transition_to(&mut self, next: RideStatus) -> Result<(), BookingError> {
        if self.can_transition_to(next) {
            *self = next;
            Ok(())
        } else {
            Err(BookingError::IllegalTransition { from: *self, to: next })
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RideStatus::Requested => "requested",
            RideStatus::Assigned => "assigned",
            RideStatus::Accepted => "accepted",
            RideStatus::OnTrip => "on_trip",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Orchestrator-allocated ride identifier. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RideId(pub u64);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ride-{}", self.0)
    }
}

/// A coordinate plus its human-readable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub location: Coordinate,
    pub label: String,
}

/// The driver attached to a ride. Inserted as a component exactly once, at
/// the `assigned` transition; its location is mutated in place only by the
/// tracking session's movement events.
#[derive(Debug, Clone, PartialEq, Component, Serialize, Deserialize)]
pub struct DriverInfo {
    pub id: String,
    pub name: String,
    pub vehicle_class: VehicleClass,
    pub location: Coordinate,
    pub rating: f64,
    pub plate_number: String,
    pub vehicle_model: String,
}

/// One rider's booking from request through terminal resolution.
/// Timestamps are simulation milliseconds.
#[derive(Debug, Clone, Component)]
pub struct Ride {
    pub id: RideId,
    pub pickup: Address,
    pub dropoff: Address,
    pub vehicle_class: VehicleClass,
    pub status: RideStatus,
    pub fare: FareEstimate,
    pub created_at: u64,
    pub estimated_arrival: Option<u64>,
}

/// What a consumer submits to book a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub pickup: Address,
    pub dropoff: Address,
    pub vehicle_class: VehicleClass,
}

/// Immutable view of a ride handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideSnapshot {
    pub id: RideId,
    pub pickup: Address,
    pub dropoff: Address,
    pub vehicle_class: VehicleClass,
    pub status: RideStatus,
    pub fare: FareEstimate,
    pub driver: Option<DriverInfo>,
    pub created_at: u64,
    pub estimated_arrival: Option<u64>,
}

impl RideSnapshot {
    pub(crate) fn from_parts(ride: &Ride, driver: Option<&DriverInfo>) -> Self {
        Self {
            id: ride.id,
            pickup: ride.pickup.clone(),
            dropoff: ride.dropoff.clone(),
            vehicle_class: ride.vehicle_class,
            status: ride.status,
            fare: ride.fare.clone(),
            driver: driver.cloned(),
            created_at: ride.created_at,
            estimated_arrival: ride.estimated_arrival,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RideStatus; 6] = [
        RideStatus::Requested,
        RideStatus::Assigned,
        RideStatus::Accepted,
        RideStatus::OnTrip,
        RideStatus::Completed,
        RideStatus::Cancelled,
    ];

    #[test]
    fn happy_path_transitions_are_legal() {
        let mut status = RideStatus::Requested;
        for next in [
            RideStatus::Assigned,
            RideStatus::Accepted,
            RideStatus::OnTrip,
            RideStatus::Completed,
        ] {
            status.transition_to(next).expect("legal transition");
        }
        assert_eq!(status, RideStatus::Completed);
    }

    #[test]
    fn skipping_states_is_rejected() {
        let mut status = RideStatus::Requested;
        assert_eq!(
            status.transition_to(RideStatus::OnTrip),
            Err(BookingError::IllegalTransition {
                from: RideStatus::Requested,
                to: RideStatus::OnTrip,
            })
        );
        assert_eq!(status, RideStatus::Requested, "rejected transition must not apply");
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for terminal in [RideStatus::Completed, RideStatus::Cancelled] {
            for next in ALL {
                assert!(
                    !terminal.can_transition_to(next),
                    "{terminal} -> {next} should be illegal"
                );
            }
        }
    }

    #[test]
    fn cancellation_window_is_pre_trip_only() {
        for status in ALL {
            let expected = matches!(
                status,
                RideStatus::Requested | RideStatus::Assigned | RideStatus::Accepted
            );
            assert_eq!(status.can_cancel(), expected, "cancel from {status}");
            assert_eq!(status.can_transition_to(RideStatus::Cancelled), expected);
        }
    }

    #[test]
    fn self_transitions_are_rejected() {
        for status in ALL {
            assert!(!status.can_transition_to(status), "{status} -> {status}");
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&RideStatus::OnTrip).expect("serialize");
        assert_eq!(json, "\"on_trip\"");
    }
}
