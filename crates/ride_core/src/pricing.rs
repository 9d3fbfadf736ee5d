//! Fare estimation: per-class rate cards and the quote formula.
//!
//! Formula: `total = base_fare + (distance_km * per_km_rate)`, with the
//! distance shown at one decimal and the total at two. The duration is a
//! fixed speed proxy (`distance * 2.5` minutes, ~24 km/h effective, floored
//! at 5 minutes), not a routed ETA.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::geo::{self, Coordinate};

/// The closed set of bookable vehicle tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Bike,
    Car,
    Xl,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [VehicleClass::Bike, VehicleClass::Car, VehicleClass::Xl];

    pub(crate) fn index(self) -> usize {
        match self {
            VehicleClass::Bike => 0,
            VehicleClass::Car => 1,
            VehicleClass::Xl => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleClass::Bike => "bike",
            VehicleClass::Car => "car",
            VehicleClass::Xl => "xl",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Base fare plus per-kilometer rate, in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub base_fare: f64,
    pub per_km_rate: f64,
}

pub const BIKE_RATES: RateCard = RateCard { base_fare: 25.0, per_km_rate: 8.0 };
pub const CAR_RATES: RateCard = RateCard { base_fare: 50.0, per_km_rate: 15.0 };
pub const XL_RATES: RateCard = RateCard { base_fare: 75.0, per_km_rate: 20.0 };

/// Minimum quoted trip duration in minutes.
pub const MIN_DURATION_MIN: u32 = 5;
/// Minutes per kilometer for the duration proxy.
pub const MINUTES_PER_KM: f64 = 2.5;

/// Deployment pricing: one optional rate card per class plus the currency
/// code. A class without a card quotes as unavailable; siblings are
/// unaffected.
#[derive(Debug, Clone, Resource)]
pub struct PricingConfig {
    pub currency: String,
    cards: [Option<RateCard>; 3],
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            cards: [Some(BIKE_RATES), Some(CAR_RATES), Some(XL_RATES)],
        }
    }
}

impl PricingConfig {
    pub fn rate_card(&self, class: VehicleClass) -> Option<RateCard> {
        self.cards[class.index()]
    }

    pub fn set_rate_card(&mut self, class: VehicleClass, card: Option<RateCard>) {
        self.cards[class.index()] = card;
    }

    pub fn without_class(mut self, class: VehicleClass) -> Self {
        self.cards[class.index()] = None;
        self
    }
}

/// A precomputed, non-binding price and time quote for one route and class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    /// Route distance rounded to one decimal for display.
    pub distance_km: f64,
    /// Speed-proxy estimate, not a routed ETA.
    pub duration_min: u32,
    pub total: f64,
    pub currency: String,
}

/// Compute the quote for one vehicle class. Pure: safe to evaluate for all
/// classes against the same pickup/dropoff pair in any order.
pub fn estimate_fare(
    config: &PricingConfig,
    pickup: Coordinate,
    dropoff: Coordinate,
    class: VehicleClass,
) -> Result<FareEstimate, BookingError> {
    let card = config
        .rate_card(class)
        .ok_or(BookingError::EstimateUnavailable { class })?;
    let pickup = Coordinate::new(pickup.lat, pickup.lng)?;
    let dropoff = Coordinate::new(dropoff.lat, dropoff.lng)?;

    let raw_km = geo::distance_km_cached(pickup, dropoff);
    let duration_min = ((raw_km * MINUTES_PER_KM).round() as u32).max(MIN_DURATION_MIN);

    Ok(FareEstimate {
        distance_km: round1(raw_km),
        duration_min,
        total: round2(card.base_fare + raw_km * card.per_km_rate),
        currency: config.currency.clone(),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
