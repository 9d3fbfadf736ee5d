//! DriverAccepted system: `assigned -> accepted`.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::ride::{Ride, RideStatus};
use crate::telemetry::EngineTelemetry;
use crate::tracking::{TrackingEvent, TrackingFeed};

pub fn driver_accepted_system(
    event: Res<CurrentEvent>,
    mut feed: ResMut<TrackingFeed>,
    mut telemetry: ResMut<EngineTelemetry>,
    mut rides: Query<&mut Ride>,
) {
    if event.0.kind != EventKind::DriverAccepted {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut ride) = rides.get_mut(ride_entity) else {
        return;
    };

    if ride.status.transition_to(RideStatus::Accepted).is_err() {
        telemetry.illegal_transitions_rejected += 1;
        return;
    }

    feed.emit(ride.id, TrackingEvent::StatusChanged { status: RideStatus::Accepted });
    tracing::debug!(ride = %ride.id, "driver accepted");
}
