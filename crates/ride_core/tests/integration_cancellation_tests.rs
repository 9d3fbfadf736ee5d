mod support;

use ride_core::clock::ONE_SEC_MS;
use ride_core::error::BookingError;
use ride_core::pricing::VehicleClass;
use ride_core::ride::{RideId, RideStatus};
use ride_core::test_helpers::{delhi_ride_request, test_orchestrator};
use support::{move_count, statuses};

#[test]
fn immediate_cancel_never_attaches_a_driver() {
    let mut orchestrator = test_orchestrator();
    let ride = orchestrator
        .request_ride(delhi_ride_request(VehicleClass::Car))
        .expect("ride requested");
    let subscriber = orchestrator.subscribe(ride.id).expect("subscribe");

    let cancelled = orchestrator.cancel_ride(ride.id).expect("cancel in requested");
    assert_eq!(cancelled.status, RideStatus::Cancelled);
    assert!(cancelled.driver.is_none());

    // The scheduled dispatch timeline must be gone: advancing produces
    // nothing beyond the cancellation event itself.
    orchestrator.advance_to(60 * ONE_SEC_MS);
    let events = orchestrator.poll_events(subscriber);
    assert_eq!(statuses(&events), vec![RideStatus::Cancelled]);
    assert_eq!(move_count(&events), 0);

    let snapshot = orchestrator.ride(ride.id).expect("snapshot");
    assert_eq!(snapshot.status, RideStatus::Cancelled);
    assert!(snapshot.driver.is_none());
    assert_eq!(orchestrator.telemetry().rides_cancelled, 1);
}

#[test]
fn cancel_while_assigned_stops_pending_timers() {
    let mut orchestrator = test_orchestrator();
    let ride = orchestrator
        .request_ride(delhi_ride_request(VehicleClass::Car))
        .expect("ride requested");
    let subscriber = orchestrator.subscribe(ride.id).expect("subscribe");

    orchestrator.advance_to(5 * ONE_SEC_MS);
    let cancelled = orchestrator.cancel_ride(ride.id).expect("cancel in assigned");
    assert_eq!(cancelled.status, RideStatus::Cancelled);
    assert!(cancelled.driver.is_some(), "driver stays on the record");

    orchestrator.advance_to(120 * ONE_SEC_MS);
    let events = orchestrator.poll_events(subscriber);
    assert_eq!(
        statuses(&events),
        vec![RideStatus::Assigned, RideStatus::Cancelled]
    );
    assert_eq!(move_count(&events), 0, "no movement after teardown");

    let history = orchestrator.ride_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RideStatus::Cancelled);
}

#[test]
fn cancel_is_rejected_once_the_trip_is_underway() {
    let mut orchestrator = test_orchestrator();
    let ride = orchestrator
        .request_ride(delhi_ride_request(VehicleClass::Car))
        .expect("ride requested");

    orchestrator.advance_to(15 * ONE_SEC_MS);
    let err = orchestrator.cancel_ride(ride.id).expect_err("cancel on trip");
    assert_eq!(
        err,
        BookingError::IllegalTransition {
            from: RideStatus::OnTrip,
            to: RideStatus::Cancelled,
        }
    );

    // The rejection is surfaced, not applied.
    let snapshot = orchestrator.ride(ride.id).expect("snapshot");
    assert_eq!(snapshot.status, RideStatus::OnTrip);
    assert_eq!(orchestrator.telemetry().illegal_transitions_rejected, 1);
    assert!(orchestrator.ride_history().is_empty());
}

#[test]
fn cancel_is_rejected_from_terminal_states() {
    let mut orchestrator = test_orchestrator();
    let ride = orchestrator
        .request_ride(delhi_ride_request(VehicleClass::Bike))
        .expect("ride requested");

    orchestrator.cancel_ride(ride.id).expect("first cancel");
    let err = orchestrator.cancel_ride(ride.id).expect_err("second cancel");
    assert_eq!(
        err,
        BookingError::IllegalTransition {
            from: RideStatus::Cancelled,
            to: RideStatus::Cancelled,
        }
    );

    // Completed rides reject cancellation the same way.
    let ride = orchestrator
        .request_ride(delhi_ride_request(VehicleClass::Bike))
        .expect("ride requested");
    orchestrator.run_until_idle(100_000);
    assert_eq!(
        orchestrator.ride(ride.id).expect("snapshot").status,
        RideStatus::Completed
    );
    let err = orchestrator.cancel_ride(ride.id).expect_err("cancel completed");
    assert!(matches!(
        err,
        BookingError::IllegalTransition { from: RideStatus::Completed, .. }
    ));
}

#[test]
fn cancel_unknown_ride_is_surfaced() {
    let mut orchestrator = test_orchestrator();
    assert_eq!(
        orchestrator.cancel_ride(RideId(404)).expect_err("unknown"),
        BookingError::UnknownRide(RideId(404))
    );
}
