//! Simulation clock: a min-heap of timestamped events.
//!
//! Every asynchronous boundary in the engine — dispatch timing, driver
//! movement, geocoder latency, fare-quote fan-out — is a scheduled event on
//! this clock. Popping advances time; events for one subject can be
//! cancelled in bulk, which is how session teardown releases its timers.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

pub const ONE_SEC_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    DriverAssigned,
    DriverAccepted,
    TripStarted,
    TripCompleted,
    DriverMove,
    QuoteReady,
    DebounceElapsed,
    SearchResolved,
    ReverseResolved,
}

/// What a scheduled event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventSubject {
    Ride(Entity),
    Quote(Entity),
    Field(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp.
        // Ties pop in kind declaration order (lifecycle before movement),
        // then by subject, so same-instant events are deterministic.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.kind.cmp(&self.kind))
            .then_with(|| other.subject.cmp(&self.subject))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        self.events.push(Event {
            timestamp,
            kind,
            subject,
        });
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now + delay_ms, kind, subject);
    }

    pub fn schedule_at_secs(&mut self, secs: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(secs * ONE_SEC_MS, kind, subject);
    }

    pub fn schedule_in_secs(&mut self, secs: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_in(secs * ONE_SEC_MS, kind, subject);
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Remove every pending event for `subject`. Returns how many were
    /// dropped. Used on session teardown so that nothing fires afterwards.
    pub fn cancel_subject(&mut self, subject: EventSubject) -> usize {
        let before = self.events.len();
        self.events.retain(|event| event.subject != Some(subject));
        before - self.events.len()
    }

    /// Remove pending events matching both `kind` and `subject` (e.g. a
    /// debounce timer being restarted by a new keystroke).
    pub fn cancel_matching(&mut self, kind: EventKind, subject: EventSubject) -> usize {
        let before = self.events.len();
        self.events
            .retain(|event| event.kind != kind || event.subject != Some(subject));
        before - self.events.len()
    }

    /// Move the clock forward to `timestamp` without processing anything.
    /// Callers must have drained events up to that point first.
    pub fn advance_to(&mut self, timestamp: u64) {
        debug_assert!(
            self.next_event_time().map_or(true, |t| t > timestamp),
            "cannot advance past pending events"
        );
        if timestamp > self.now {
            self.now = timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::DriverMove, None);
        clock.schedule_at(5, EventKind::DriverAssigned, None);
        clock.schedule_at(20, EventKind::TripStarted, None);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn cancel_subject_drops_all_pending_events_for_it() {
        let mut clock = SimulationClock::default();
        let ride = Entity::from_raw(1);
        let other = Entity::from_raw(2);
        clock.schedule_at(5, EventKind::DriverMove, Some(EventSubject::Ride(ride)));
        clock.schedule_at(10, EventKind::TripStarted, Some(EventSubject::Ride(ride)));
        clock.schedule_at(7, EventKind::DriverMove, Some(EventSubject::Ride(other)));

        assert_eq!(clock.cancel_subject(EventSubject::Ride(ride)), 2);
        let survivor = clock.pop_next().expect("unrelated event survives");
        assert_eq!(survivor.subject, Some(EventSubject::Ride(other)));
        assert!(clock.is_empty());
    }

    #[test]
    fn cancel_matching_only_touches_one_kind() {
        let mut clock = SimulationClock::default();
        let field = Entity::from_raw(3);
        let subject = EventSubject::Field(field);
        clock.schedule_at(300, EventKind::DebounceElapsed, Some(subject));
        clock.schedule_at(400, EventKind::SearchResolved, Some(subject));

        assert_eq!(clock.cancel_matching(EventKind::DebounceElapsed, subject), 1);
        let survivor = clock.pop_next().expect("resolved event survives");
        assert_eq!(survivor.kind, EventKind::SearchResolved);
    }

    #[test]
    fn advance_to_moves_time_forward_only() {
        let mut clock = SimulationClock::default();
        clock.advance_to(500);
        assert_eq!(clock.now(), 500);
        clock.advance_to(100);
        assert_eq!(clock.now(), 500);
    }
}
