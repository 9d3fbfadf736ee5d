use ride_core::geo::{self, Coordinate};
use ride_core::orchestrator::{OrchestratorParams, RideOrchestrator};
use ride_core::pricing::{PricingConfig, VehicleClass, CAR_RATES};
use ride_core::quotes::QUOTE_LATENCY_MS;
use ride_core::test_helpers::{test_orchestrator, CONNAUGHT_PLACE, NOIDA_SECTOR_18};

#[test]
fn fan_out_resolves_every_class_independently() {
    let mut orchestrator = test_orchestrator();
    let estimates = orchestrator.get_fare_estimates(CONNAUGHT_PLACE, NOIDA_SECTOR_18);

    let bike = estimates.bike.as_ref().expect("bike estimate");
    let car = estimates.car.as_ref().expect("car estimate");
    let xl = estimates.xl.as_ref().expect("xl estimate");

    // Same route: identical distance and duration, totals ordered by tier.
    assert_eq!(bike.distance_km, car.distance_km);
    assert_eq!(car.distance_km, xl.distance_km);
    assert_eq!(bike.duration_min, xl.duration_min);
    assert!(bike.total < car.total && car.total < xl.total);
    assert!(estimates.get(VehicleClass::Car).is_some());
}

#[test]
fn delhi_scenario_matches_the_rate_table() {
    let mut orchestrator = test_orchestrator();
    let estimates = orchestrator.get_fare_estimates(CONNAUGHT_PLACE, NOIDA_SECTOR_18);
    let car = estimates.car.expect("car estimate");

    let raw_km = geo::distance_km(CONNAUGHT_PLACE, NOIDA_SECTOR_18);
    assert!((raw_km - 19.8).abs() < 0.05);
    assert_eq!(car.distance_km, 19.8);
    assert_eq!(car.duration_min, 49);
    let expected_total = CAR_RATES.base_fare + raw_km * CAR_RATES.per_km_rate;
    assert!((car.total - expected_total).abs() < 0.01);
    assert_eq!(car.currency, "INR");
}

#[test]
fn quotes_resolve_on_the_board_as_events_fire() {
    let mut orchestrator = test_orchestrator();
    let batch = orchestrator.request_fare_estimates(CONNAUGHT_PLACE, NOIDA_SECTOR_18);
    assert!(!orchestrator.quotes_complete(batch));

    orchestrator.advance_by(QUOTE_LATENCY_MS);
    assert!(orchestrator.quotes_complete(batch));
    let estimates = orchestrator.fare_estimates(batch).expect("estimates");
    assert!(estimates.bike.is_some() && estimates.car.is_some() && estimates.xl.is_some());
    assert_eq!(orchestrator.telemetry().quotes_resolved, 3);
}

#[test]
fn unavailable_class_does_not_abort_siblings() {
    let mut orchestrator = RideOrchestrator::with_params(OrchestratorParams {
        pricing: PricingConfig::default().without_class(VehicleClass::Xl),
        ..OrchestratorParams::default()
    });

    let estimates = orchestrator.get_fare_estimates(CONNAUGHT_PLACE, NOIDA_SECTOR_18);
    assert!(estimates.bike.is_some());
    assert!(estimates.car.is_some());
    assert!(estimates.xl.is_none(), "xl surfaces as unavailable");

    let telemetry = orchestrator.telemetry();
    assert_eq!(telemetry.quotes_resolved, 2);
    assert_eq!(telemetry.quotes_unavailable, 1);
}

#[test]
fn invalid_route_resolves_all_branches_as_unavailable() {
    let mut orchestrator = test_orchestrator();
    let bad = Coordinate { lat: 95.0, lng: 77.0 };
    let estimates = orchestrator.get_fare_estimates(bad, NOIDA_SECTOR_18);

    assert!(estimates.bike.is_none());
    assert!(estimates.car.is_none());
    assert!(estimates.xl.is_none());
    // Every branch still resolved; the batch is not stuck.
    assert_eq!(orchestrator.telemetry().quotes_unavailable, 3);
}

#[test]
fn repeated_batches_are_deterministic() {
    let mut orchestrator = test_orchestrator();
    let first = orchestrator.get_fare_estimates(CONNAUGHT_PLACE, NOIDA_SECTOR_18);
    let second = orchestrator.get_fare_estimates(CONNAUGHT_PLACE, NOIDA_SECTOR_18);
    assert_eq!(first, second);
}
