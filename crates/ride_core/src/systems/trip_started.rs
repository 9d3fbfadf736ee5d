//! TripStarted system: `accepted -> on_trip`, with completion scheduled at
//! the fare's estimated duration.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock, ONE_SEC_MS};
use crate::ride::{Ride, RideStatus};
use crate::telemetry::EngineTelemetry;
use crate::tracking::{TrackingEvent, TrackingFeed};

pub fn trip_started_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut feed: ResMut<TrackingFeed>,
    mut telemetry: ResMut<EngineTelemetry>,
    mut rides: Query<&mut Ride>,
) {
    if event.0.kind != EventKind::TripStarted {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut ride) = rides.get_mut(ride_entity) else {
        return;
    };

    if ride.status.transition_to(RideStatus::OnTrip).is_err() {
        telemetry.illegal_transitions_rejected += 1;
        return;
    }

    feed.emit(ride.id, TrackingEvent::StatusChanged { status: RideStatus::OnTrip });

    // The duration heuristic doubles as the simulated trip length.
    let trip_ms = u64::from(ride.fare.duration_min) * 60 * ONE_SEC_MS;
    clock.schedule_in(
        trip_ms,
        EventKind::TripCompleted,
        Some(EventSubject::Ride(ride_entity)),
    );
    tracing::debug!(ride = %ride.id, trip_ms, "trip started");
}
