//! Fare-quote fan-out: one independently resolved branch per vehicle class.
//!
//! A batch opens on the [`QuoteBoard`], one [`QuoteRequest`] entity is
//! spawned per class, and each resolves at its own `QuoteReady` event. A
//! branch that fails surfaces as "unavailable" for that class only; siblings
//! are never aborted.

use std::collections::HashMap;

use bevy_ecs::prelude::{Component, Resource};
use serde::Serialize;

use crate::geo::Coordinate;
use crate::pricing::{FareEstimate, VehicleClass};

/// Simulated round-trip latency for one fare-quote branch.
pub const QUOTE_LATENCY_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QuoteBatchId(pub u64);

/// In-flight quote computation for a single vehicle class.
#[derive(Debug, Clone, Copy, Component)]
pub struct QuoteRequest {
    pub batch: QuoteBatchId,
    pub class: VehicleClass,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
}

/// Per-class estimates; `None` means "estimate unavailable" for that class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EstimateSet {
    pub bike: Option<FareEstimate>,
    pub car: Option<FareEstimate>,
    pub xl: Option<FareEstimate>,
}

impl EstimateSet {
    pub fn get(&self, class: VehicleClass) -> Option<&FareEstimate> {
        match class {
            VehicleClass::Bike => self.bike.as_ref(),
            VehicleClass::Car => self.car.as_ref(),
            VehicleClass::Xl => self.xl.as_ref(),
        }
    }

    fn set(&mut self, class: VehicleClass, estimate: Option<FareEstimate>) {
        match class {
            VehicleClass::Bike => self.bike = estimate,
            VehicleClass::Car => self.car = estimate,
            VehicleClass::Xl => self.xl = estimate,
        }
    }
}

/// One fan-out in progress (or finished).
#[derive(Debug, Default)]
pub struct QuoteBatch {
    estimates: EstimateSet,
    resolved: [bool; 3],
}

impl QuoteBatch {
    pub fn estimates(&self) -> &EstimateSet {
        &self.estimates
    }

    /// All three branches have resolved, successfully or not.
    pub fn is_complete(&self) -> bool {
        self.resolved.iter().all(|done| *done)
    }

    fn resolve(&mut self, class: VehicleClass, estimate: Option<FareEstimate>) {
        self.estimates.set(class, estimate);
        self.resolved[class.index()] = true;
    }
}

#[derive(Debug, Default, Resource)]
pub struct QuoteBoard {
    batches: HashMap<QuoteBatchId, QuoteBatch>,
    next_batch: u64,
}

impl QuoteBoard {
    pub(crate) fn open(&mut self) -> QuoteBatchId {
        self.next_batch += 1;
        let id = QuoteBatchId(self.next_batch);
        self.batches.insert(id, QuoteBatch::default());
        id
    }

    pub fn batch(&self, id: QuoteBatchId) -> Option<&QuoteBatch> {
        self.batches.get(&id)
    }

    pub fn estimates(&self, id: QuoteBatchId) -> Option<&EstimateSet> {
        self.batches.get(&id).map(QuoteBatch::estimates)
    }

    pub fn is_complete(&self, id: QuoteBatchId) -> bool {
        self.batches.get(&id).map_or(false, QuoteBatch::is_complete)
    }

    pub(crate) fn resolve(
        &mut self,
        id: QuoteBatchId,
        class: VehicleClass,
        estimate: Option<FareEstimate>,
    ) {
        if let Some(batch) = self.batches.get_mut(&id) {
            batch.resolve(class, estimate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{estimate_fare, PricingConfig};

    #[test]
    fn batch_completes_when_all_branches_resolve() {
        let mut board = QuoteBoard::default();
        let id = board.open();
        assert!(!board.is_complete(id));

        let config = PricingConfig::default();
        let pickup = Coordinate { lat: 28.6139, lng: 77.2090 };
        let dropoff = Coordinate { lat: 28.5355, lng: 77.3910 };

        for class in VehicleClass::ALL {
            let estimate = estimate_fare(&config, pickup, dropoff, class).ok();
            board.resolve(id, class, estimate);
        }

        assert!(board.is_complete(id));
        let estimates = board.estimates(id).expect("estimates");
        assert!(estimates.bike.is_some());
        assert!(estimates.car.is_some());
        assert!(estimates.xl.is_some());
    }

    #[test]
    fn failed_branch_leaves_siblings_resolved() {
        let mut board = QuoteBoard::default();
        let id = board.open();
        board.resolve(id, VehicleClass::Bike, None);
        assert!(!board.is_complete(id));
        assert_eq!(board.estimates(id).expect("estimates").get(VehicleClass::Bike), None);
    }
}
