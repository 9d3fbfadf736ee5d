//! Scripted booking session against the ride engine: search both endpoints,
//! compare fares, book, follow the tracking feed, and optionally cancel
//! mid-ride. Simulated time is driven step by step so the feed can be
//! printed as it would stream.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ride_core::clock::ONE_SEC_MS;
use ride_core::orchestrator::{OrchestratorParams, RideOrchestrator};
use ride_core::pricing::VehicleClass;
use ride_core::ride::{Address, RideRequest, RideStatus};
use ride_core::tracking::{TrackingConfig, TrackingEvent};

#[derive(Debug, Parser)]
#[command(name = "ride_console", about = "Drive a scripted ride booking session")]
struct Args {
    /// Pickup search query.
    #[arg(long, default_value = "connaught")]
    pickup: String,

    /// Drop-off search query.
    #[arg(long, default_value = "noida")]
    dropoff: String,

    /// Vehicle class: bike, car or xl.
    #[arg(long, default_value = "car", value_parser = parse_class)]
    class: VehicleClass,

    /// Cancel the ride this many seconds in (before the trip starts).
    #[arg(long)]
    cancel_after: Option<u64>,

    /// RNG seed for the simulated dispatch.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn parse_class(value: &str) -> Result<VehicleClass, String> {
    match value {
        "bike" => Ok(VehicleClass::Bike),
        "car" => Ok(VehicleClass::Car),
        "xl" => Ok(VehicleClass::Xl),
        other => Err(format!("unknown vehicle class: {other}")),
    }
}

fn resolve_address(
    orchestrator: &mut RideOrchestrator,
    query: &str,
) -> Result<Address, Box<dyn std::error::Error>> {
    let field = orchestrator.create_search_field();
    orchestrator.keystroke(field, query);
    orchestrator.advance_by(ONE_SEC_MS);

    let suggestions = orchestrator.suggestions(field);
    if suggestions.is_empty() {
        return Err(format!("no location found for {query:?}").into());
    }
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("  [{i}] {}", suggestion.display_name);
    }
    let address = orchestrator
        .accept_suggestion(field, 0)
        .ok_or("no suggestion to accept")?;
    println!("  -> {}", address.label);
    Ok(address)
}

fn print_events(at_ms: u64, events: &[TrackingEvent]) {
    for event in events {
        match event {
            TrackingEvent::StatusChanged { status } => {
                println!("[{:>6.1}s] status: {status}", at_ms as f64 / 1000.0);
            }
            TrackingEvent::DriverMoved { location } => {
                println!(
                    "[{:>6.1}s] driver at {:.4}, {:.4}",
                    at_ms as f64 / 1000.0,
                    location.lat,
                    location.lng
                );
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();
    let mut orchestrator = RideOrchestrator::with_params(OrchestratorParams {
        tracking: TrackingConfig { seed: args.seed, ..TrackingConfig::default() },
        ..OrchestratorParams::default()
    });

    println!("Searching pickup {:?}:", args.pickup);
    let pickup = resolve_address(&mut orchestrator, &args.pickup)?;
    println!("Searching drop-off {:?}:", args.dropoff);
    let dropoff = resolve_address(&mut orchestrator, &args.dropoff)?;

    println!("\nFare estimates:");
    let estimates = orchestrator.get_fare_estimates(pickup.location, dropoff.location);
    for class in VehicleClass::ALL {
        match estimates.get(class) {
            Some(fare) => println!(
                "  {class:<4} {:>8.2} {}  ({} km, ~{} min)",
                fare.total, fare.currency, fare.distance_km, fare.duration_min
            ),
            None => println!("  {class:<4} unavailable"),
        }
    }

    let ride = orchestrator.request_ride(RideRequest {
        pickup,
        dropoff,
        vehicle_class: args.class,
    })?;
    println!("\nBooked {} ({}), status: {}", ride.id, args.class, ride.status);

    let subscriber = orchestrator.subscribe(ride.id)?;
    let booked_at = orchestrator.now();
    let mut cancelled = false;

    loop {
        orchestrator.advance_by(ONE_SEC_MS);
        let events = orchestrator.poll_events(subscriber);
        print_events(orchestrator.now(), &events);

        let elapsed_s = (orchestrator.now() - booked_at) / ONE_SEC_MS;
        if let Some(cancel_after) = args.cancel_after {
            if !cancelled && elapsed_s >= cancel_after {
                match orchestrator.cancel_ride(ride.id) {
                    Ok(snapshot) => {
                        println!("Cancelled {} at {elapsed_s}s", snapshot.id);
                        cancelled = true;
                    }
                    Err(err) => {
                        println!("Cancellation rejected: {err}");
                        return Err(err.into());
                    }
                }
            }
        }

        let status = orchestrator
            .ride(ride.id)
            .map(|snapshot| snapshot.status)
            .ok_or("ride disappeared")?;
        if status.is_terminal() {
            print_events(orchestrator.now(), &orchestrator.poll_events(subscriber));
            println!("\nFinal status: {status}");
            break;
        }

        // Fast-forward through the long on-trip stretch.
        if status == RideStatus::OnTrip && args.cancel_after.is_none() {
            orchestrator.run_until_idle(1_000_000);
        }
    }

    let history = orchestrator.ride_history();
    println!("\nRide history ({} entries):", history.len());
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}
