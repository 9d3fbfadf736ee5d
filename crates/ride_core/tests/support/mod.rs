#![allow(dead_code)]

use ride_core::ride::RideStatus;
use ride_core::tracking::TrackingEvent;

/// Status transitions in emission order, with movement events stripped.
pub fn statuses(events: &[TrackingEvent]) -> Vec<RideStatus> {
    events
        .iter()
        .filter_map(|event| match event {
            TrackingEvent::StatusChanged { status } => Some(*status),
            TrackingEvent::DriverMoved { .. } => None,
        })
        .collect()
}

/// Number of driver position updates in the slice.
pub fn move_count(events: &[TrackingEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, TrackingEvent::DriverMoved { .. }))
        .count()
}
