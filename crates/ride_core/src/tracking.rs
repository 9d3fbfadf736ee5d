//! Tracking feed: the live event stream bound to one ride's lifetime.
//!
//! Producers (the simulated dispatch systems, or a real push channel) emit
//! through [`TrackingFeed::emit`]; consumers subscribe by ride id and drain
//! an independent cursor over the ride's ordered log, so every subscriber
//! observes the same sequence (broadcast, not a one-shot queue). Closing a
//! session stops further emissions; the orchestrator pairs that with bulk
//! timer cancellation on the clock.

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::geo::Coordinate;
use crate::pricing::VehicleClass;
use crate::ride::{DriverInfo, RideId, RideStatus};

/// Per-axis spread when placing a newly assigned driver near the pickup.
pub const DRIVER_SPAWN_SPREAD_DEG: f64 = 0.005;
/// Per-axis jitter applied on every movement step.
pub const DRIVER_JITTER_DEG: f64 = 0.0005;

/// One emission on a ride's feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackingEvent {
    StatusChanged { status: RideStatus },
    DriverMoved { location: Coordinate },
}

/// Handle for one subscription to one ride's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Debug, Default)]
struct RideLog {
    events: Vec<TrackingEvent>,
    closed: bool,
}

#[derive(Debug)]
struct Subscription {
    ride: RideId,
    cursor: usize,
}

#[derive(Debug, Default, Resource)]
pub struct TrackingFeed {
    logs: HashMap<RideId, RideLog>,
    subscriptions: HashMap<SubscriberId, Subscription>,
    next_subscriber: u64,
}

impl TrackingFeed {
    pub fn open_session(&mut self, ride: RideId) {
        self.logs.entry(ride).or_default();
    }

    pub fn is_open(&self, ride: RideId) -> bool {
        self.logs.get(&ride).map_or(false, |log| !log.closed)
    }

    /// Append an event to the ride's log. Returns `false` (and drops the
    /// event) if the session is closed or was never opened.
    pub fn emit(&mut self, ride: RideId, event: TrackingEvent) -> bool {
        match self.logs.get_mut(&ride) {
            Some(log) if !log.closed => {
                log.events.push(event);
                true
            }
            _ => false,
        }
    }

    /// Stop the session: no emission is accepted afterwards. Subscribers can
    /// still drain what was already emitted.
    pub fn close_session(&mut self, ride: RideId) {
        if let Some(log) = self.logs.get_mut(&ride) {
            log.closed = true;
        }
    }

    pub fn event_count(&self, ride: RideId) -> usize {
        self.logs.get(&ride).map_or(0, |log| log.events.len())
    }

    pub fn subscribe(&mut self, ride: RideId) -> SubscriberId {
        self.next_subscriber += 1;
        let id = SubscriberId(self.next_subscriber);
        self.subscriptions.insert(id, Subscription { ride, cursor: 0 });
        id
    }

    /// Drain everything emitted since the subscriber's last poll, in
    /// emission order.
    pub fn poll(&mut self, subscriber: SubscriberId) -> Vec<TrackingEvent> {
        let Some(subscription) = self.subscriptions.get_mut(&subscriber) else {
            return Vec::new();
        };
        let Some(log) = self.logs.get(&subscription.ride) else {
            return Vec::new();
        };
        let events = log.events[subscription.cursor..].to_vec();
        subscription.cursor = log.events.len();
        events
    }

    pub fn unsubscribe(&mut self, subscriber: SubscriberId) {
        self.subscriptions.remove(&subscriber);
    }
}

/// Timing of the simulated dispatch feed. These fixed offsets stand in for
/// real dispatch events; a production backend would replace the producer,
/// not the feed contract.
#[derive(Debug, Clone, Copy, Resource)]
pub struct TrackingConfig {
    /// Offset from request to driver assignment.
    pub assigned_delay_ms: u64,
    /// Offset from request to driver acceptance.
    pub accepted_delay_ms: u64,
    /// Offset from request to trip start.
    pub trip_start_delay_ms: u64,
    /// Interval between driver position updates.
    pub move_interval_ms: u64,
    /// Seed for the movement/roster RNG (for reproducibility).
    pub seed: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            assigned_delay_ms: 3_000,
            accepted_delay_ms: 8_000,
            trip_start_delay_ms: 15_000,
            move_interval_ms: 5_000,
            seed: 0,
        }
    }
}

/// Seeded RNG behind the simulated dispatch (driver roster, spawn placement,
/// movement jitter).
#[derive(Resource)]
pub struct TrackingRng(pub StdRng);

impl TrackingRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

const DRIVER_NAMES: [&str; 6] = [
    "Ravi Sharma",
    "Rajesh Kumar",
    "Amit Singh",
    "Priya Verma",
    "Sunil Yadav",
    "Neha Gupta",
];

fn vehicle_model(class: VehicleClass) -> &'static str {
    match class {
        VehicleClass::Bike => "Honda Activa",
        VehicleClass::Car => "Maruti Swift",
        VehicleClass::Xl => "Toyota Innova",
    }
}

/// Pick a driver from the roster and place them near the pickup point.
pub(crate) fn assign_driver(
    rng: &mut StdRng,
    class: VehicleClass,
    pickup: Coordinate,
    ride: RideId,
) -> DriverInfo {
    let name = DRIVER_NAMES[rng.gen_range(0..DRIVER_NAMES.len())];
    let letters: String = (0..2)
        .map(|_| (b'A' + rng.gen_range(0..26u8)) as char)
        .collect();
    let plate_number = format!("DL{:02}{}{}", rng.gen_range(1..=14u32), letters, rng.gen_range(1000..=9999u32));
    let rating = (rng.gen_range(4.3..=4.9f64) * 10.0).round() / 10.0;
    let location = Coordinate {
        lat: pickup.lat + rng.gen_range(-DRIVER_SPAWN_SPREAD_DEG..=DRIVER_SPAWN_SPREAD_DEG),
        lng: pickup.lng + rng.gen_range(-DRIVER_SPAWN_SPREAD_DEG..=DRIVER_SPAWN_SPREAD_DEG),
    };

    DriverInfo {
        id: format!("driver-{}", ride.0),
        name: name.to_string(),
        vehicle_class: class,
        location,
        rating,
        plate_number,
        vehicle_model: vehicle_model(class).to_string(),
    }
}

/// One movement step: uniform jitter per axis, clamped to valid ranges.
pub(crate) fn jitter_position(rng: &mut StdRng, location: Coordinate) -> Coordinate {
    Coordinate {
        lat: (location.lat + rng.gen_range(-DRIVER_JITTER_DEG..=DRIVER_JITTER_DEG))
            .clamp(-90.0, 90.0),
        lng: (location.lng + rng.gen_range(-DRIVER_JITTER_DEG..=DRIVER_JITTER_DEG))
            .clamp(-180.0, 180.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_appends_in_order_and_broadcasts() {
        let mut feed = TrackingFeed::default();
        let ride = RideId(1);
        feed.open_session(ride);

        let first = feed.subscribe(ride);
        assert!(feed.emit(ride, TrackingEvent::StatusChanged { status: RideStatus::Assigned }));
        let second = feed.subscribe(ride);
        assert!(feed.emit(ride, TrackingEvent::StatusChanged { status: RideStatus::Accepted }));

        let seen_first = feed.poll(first);
        assert_eq!(
            seen_first,
            vec![
                TrackingEvent::StatusChanged { status: RideStatus::Assigned },
                TrackingEvent::StatusChanged { status: RideStatus::Accepted },
            ]
        );
        // A late subscriber still sees the full sequence from the start.
        assert_eq!(feed.poll(second), seen_first);
        // Nothing new: polls drain.
        assert!(feed.poll(first).is_empty());
    }

    #[test]
    fn closed_session_drops_emissions() {
        let mut feed = TrackingFeed::default();
        let ride = RideId(2);
        feed.open_session(ride);
        feed.close_session(ride);
        assert!(!feed.emit(ride, TrackingEvent::StatusChanged { status: RideStatus::Assigned }));
        assert_eq!(feed.event_count(ride), 0);
    }

    #[test]
    fn emit_without_session_is_rejected() {
        let mut feed = TrackingFeed::default();
        assert!(!feed.emit(RideId(3), TrackingEvent::StatusChanged { status: RideStatus::Assigned }));
    }

    #[test]
    fn assigned_driver_spawns_near_pickup() {
        let mut rng = StdRng::seed_from_u64(7);
        let pickup = Coordinate { lat: 28.6139, lng: 77.2090 };
        let driver = assign_driver(&mut rng, VehicleClass::Car, pickup, RideId(9));
        assert!((driver.location.lat - pickup.lat).abs() <= DRIVER_SPAWN_SPREAD_DEG);
        assert!((driver.location.lng - pickup.lng).abs() <= DRIVER_SPAWN_SPREAD_DEG);
        assert_eq!(driver.vehicle_model, "Maruti Swift");
        assert!((4.3..=4.9).contains(&driver.rating));
        assert_eq!(driver.id, "driver-9");
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut location = Coordinate { lat: 28.6139, lng: 77.2090 };
        for _ in 0..100 {
            let next = jitter_position(&mut rng, location);
            assert!((next.lat - location.lat).abs() <= DRIVER_JITTER_DEG);
            assert!((next.lng - location.lng).abs() <= DRIVER_JITTER_DEG);
            assert!(next.is_valid());
            location = next;
        }
    }
}
