//! DriverMove system: jittered position updates while a driver is attached
//! and the ride is not terminal.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ride::{DriverInfo, Ride};
use crate::tracking::{self, TrackingConfig, TrackingEvent, TrackingFeed, TrackingRng};

pub fn driver_move_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    config: Res<TrackingConfig>,
    mut rng: ResMut<TrackingRng>,
    mut feed: ResMut<TrackingFeed>,
    mut rides: Query<(&Ride, &mut DriverInfo)>,
) {
    if event.0.kind != EventKind::DriverMove {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok((ride, mut driver)) = rides.get_mut(ride_entity) else {
        return;
    };
    // Teardown cancels pending moves; this guard covers the same-timestamp race.
    if ride.status.is_terminal() {
        return;
    }

    driver.location = tracking::jitter_position(&mut rng.0, driver.location);
    feed.emit(ride.id, TrackingEvent::DriverMoved { location: driver.location });

    clock.schedule_in(
        config.move_interval_ms,
        EventKind::DriverMove,
        Some(EventSubject::Ride(ride_entity)),
    );
}
