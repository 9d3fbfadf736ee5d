use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ride_core::geo::{self, Coordinate};
use ride_core::pricing::{estimate_fare, PricingConfig, VehicleClass};
use ride_core::test_helpers::{delhi_ride_request, test_orchestrator};

const PICKUP: Coordinate = Coordinate { lat: 28.6139, lng: 77.2090 };
const DROPOFF: Coordinate = Coordinate { lat: 28.5355, lng: 77.3910 };

fn bench_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| geo::distance_km(black_box(PICKUP), black_box(DROPOFF)))
    });

    c.bench_function("haversine_distance_cached", |b| {
        b.iter(|| geo::distance_km_cached(black_box(PICKUP), black_box(DROPOFF)))
    });
}

fn bench_fare_estimates(c: &mut Criterion) {
    let config = PricingConfig::default();
    c.bench_function("fare_estimate_all_classes", |b| {
        b.iter(|| {
            for class in VehicleClass::ALL {
                black_box(estimate_fare(&config, PICKUP, DROPOFF, class).expect("estimate"));
            }
        })
    });
}

fn bench_ride_lifecycle(c: &mut Criterion) {
    c.bench_function("ride_lifecycle_to_completion", |b| {
        b.iter(|| {
            let mut orchestrator = test_orchestrator();
            let ride = orchestrator
                .request_ride(delhi_ride_request(VehicleClass::Car))
                .expect("ride requested");
            orchestrator.run_until_idle(100_000);
            black_box(orchestrator.ride(ride.id));
        })
    });
}

criterion_group!(
    benches,
    bench_distance,
    bench_fare_estimates,
    bench_ride_lifecycle
);
criterion_main!(benches);
