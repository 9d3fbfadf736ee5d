//! TripCompleted system: `on_trip -> completed`, session teardown, history.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ride::{DriverInfo, Ride, RideSnapshot, RideStatus};
use crate::telemetry::{EngineTelemetry, RideHistory};
use crate::tracking::{TrackingEvent, TrackingFeed};

pub fn trip_completed_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut feed: ResMut<TrackingFeed>,
    mut telemetry: ResMut<EngineTelemetry>,
    mut history: ResMut<RideHistory>,
    mut rides: Query<(&mut Ride, Option<&DriverInfo>)>,
) {
    if event.0.kind != EventKind::TripCompleted {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok((mut ride, driver)) = rides.get_mut(ride_entity) else {
        return;
    };

    if ride.status.transition_to(RideStatus::Completed).is_err() {
        telemetry.illegal_transitions_rejected += 1;
        return;
    }

    feed.emit(ride.id, TrackingEvent::StatusChanged { status: RideStatus::Completed });
    feed.close_session(ride.id);
    // Drop any still-pending movement steps for this ride.
    clock.cancel_subject(EventSubject::Ride(ride_entity));

    history.record(RideSnapshot::from_parts(&ride, driver));
    telemetry.rides_completed += 1;
    tracing::info!(ride = %ride.id, "trip completed");
}
