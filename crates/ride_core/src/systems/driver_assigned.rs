//! DriverAssigned system: attach a driver and move the ride to `assigned`.
//!
//! The driver is attached in the same step as the `requested -> assigned`
//! transition, never before; the first movement step is scheduled from here.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ride::{Ride, RideStatus};
use crate::telemetry::EngineTelemetry;
use crate::tracking::{self, TrackingConfig, TrackingEvent, TrackingFeed, TrackingRng};

pub fn driver_assigned_system(
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    config: Res<TrackingConfig>,
    mut rng: ResMut<TrackingRng>,
    mut feed: ResMut<TrackingFeed>,
    mut telemetry: ResMut<EngineTelemetry>,
    mut rides: Query<&mut Ride>,
) {
    if event.0.kind != EventKind::DriverAssigned {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut ride) = rides.get_mut(ride_entity) else {
        return;
    };

    if ride.status.transition_to(RideStatus::Assigned).is_err() {
        telemetry.illegal_transitions_rejected += 1;
        return;
    }

    let driver = tracking::assign_driver(
        &mut rng.0,
        ride.vehicle_class,
        ride.pickup.location,
        ride.id,
    );
    commands.entity(ride_entity).insert(driver);

    feed.emit(ride.id, TrackingEvent::StatusChanged { status: RideStatus::Assigned });
    clock.schedule_in(
        config.move_interval_ms,
        EventKind::DriverMove,
        Some(EventSubject::Ride(ride_entity)),
    );
    tracing::debug!(ride = %ride.id, "driver assigned");
}
