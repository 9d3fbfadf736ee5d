//! Telemetry counters and the ride history buffer.

use bevy_ecs::prelude::Resource;

use crate::ride::RideSnapshot;

/// Engine-wide counters. Tests lean on these to assert invariants (exactly
/// one search issued, a stale response discarded, an illegal transition
/// rejected) without reaching into internals.
#[derive(Debug, Default, Clone, Resource)]
pub struct EngineTelemetry {
    pub searches_issued: u64,
    pub stale_responses_discarded: u64,
    pub geocoder_failures: u64,
    pub reverse_fallbacks: u64,
    pub quotes_resolved: u64,
    pub quotes_unavailable: u64,
    pub rides_requested: u64,
    pub rides_completed: u64,
    pub rides_cancelled: u64,
    pub illegal_transitions_rejected: u64,
}

/// Terminal rides (completed or cancelled), in resolution order.
#[derive(Debug, Default, Resource)]
pub struct RideHistory {
    rides: Vec<RideSnapshot>,
}

impl RideHistory {
    pub(crate) fn record(&mut self, snapshot: RideSnapshot) {
        self.rides.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }

    /// Most recently resolved ride first.
    pub fn newest_first(&self) -> Vec<RideSnapshot> {
        let mut rides = self.rides.clone();
        rides.reverse();
        rides
    }
}
