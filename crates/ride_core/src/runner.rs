//! Event pump: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each
//! step pops the next event from [`SimulationClock`], inserts it as
//! [`CurrentEvent`], then runs the schedule.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::systems::{
    driver_accepted::driver_accepted_system, driver_assigned::driver_assigned_system,
    driver_move::driver_move_system, quote_ready::quote_ready_system,
    reverse_resolved::reverse_resolved_system, search_debounce::search_debounce_system,
    search_resolved::search_resolved_system, trip_completed::trip_completed_system,
    trip_started::trip_started_system,
};

// Condition functions for each event kind
fn is_driver_assigned(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DriverAssigned)
        .unwrap_or(false)
}

fn is_driver_accepted(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DriverAccepted)
        .unwrap_or(false)
}

fn is_trip_started(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::TripStarted)
        .unwrap_or(false)
}

fn is_trip_completed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::TripCompleted)
        .unwrap_or(false)
}

fn is_driver_move(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DriverMove)
        .unwrap_or(false)
}

fn is_quote_ready(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::QuoteReady)
        .unwrap_or(false)
}

fn is_debounce_elapsed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DebounceElapsed)
        .unwrap_or(false)
}

fn is_search_resolved(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::SearchResolved)
        .unwrap_or(false)
}

fn is_reverse_resolved(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ReverseResolved)
        .unwrap_or(false)
}

/// Builds the booking schedule: all event-reacting systems plus
/// [`apply_deferred`] so that inserted components (e.g. a ride's
/// [`crate::ride::DriverInfo`]) are applied before the next step.
///
/// Systems are conditionally executed based on event type to reduce overhead.
pub fn booking_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        // DriverAssigned
        driver_assigned_system.run_if(is_driver_assigned),
        // DriverAccepted
        driver_accepted_system.run_if(is_driver_accepted),
        // TripStarted
        trip_started_system.run_if(is_trip_started),
        // TripCompleted
        trip_completed_system.run_if(is_trip_completed),
        // DriverMove
        driver_move_system.run_if(is_driver_move),
        // QuoteReady
        quote_ready_system.run_if(is_quote_ready),
        // DebounceElapsed
        search_debounce_system.run_if(is_debounce_elapsed),
        // SearchResolved
        search_resolved_system.run_if(is_search_resolved),
        // ReverseResolved
        reverse_resolved_system.run_if(is_reverse_resolved),
        // Always run apply_deferred so inserted components are available
        apply_deferred,
    ));

    schedule
}

/// Runs one step: pops the next event, inserts it as [`CurrentEvent`], then
/// runs the schedule. Returns `false` if the clock was empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(event) => event,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Like [`run_next_event`], but refuses to pop an event scheduled after
/// `limit_ms` (inclusive bound: an event exactly at the limit is processed).
pub fn run_next_event_until(world: &mut World, schedule: &mut Schedule, limit_ms: u64) -> bool {
    let due = world
        .resource::<SimulationClock>()
        .next_event_time()
        .map_or(false, |t| t <= limit_ms);
    if !due {
        return false;
    }
    run_next_event(world, schedule)
}

/// Runs steps until the event queue is empty or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}
