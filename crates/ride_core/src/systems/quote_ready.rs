//! QuoteReady system: resolve one fare-quote branch.
//!
//! Each vehicle class resolves at its own event; a failing branch surfaces
//! as "unavailable" on the board without touching its siblings.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::pricing::{self, PricingConfig};
use crate::quotes::{QuoteBoard, QuoteRequest};
use crate::telemetry::EngineTelemetry;

pub fn quote_ready_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    pricing: Res<PricingConfig>,
    mut board: ResMut<QuoteBoard>,
    mut telemetry: ResMut<EngineTelemetry>,
    requests: Query<&QuoteRequest>,
) {
    if event.0.kind != EventKind::QuoteReady {
        return;
    }
    let Some(EventSubject::Quote(request_entity)) = event.0.subject else {
        return;
    };
    let Ok(request) = requests.get(request_entity) else {
        return;
    };

    let outcome = pricing::estimate_fare(&pricing, request.pickup, request.dropoff, request.class);
    match &outcome {
        Ok(_) => telemetry.quotes_resolved += 1,
        Err(err) => {
            telemetry.quotes_unavailable += 1;
            tracing::warn!(class = %request.class, error = %err, "fare estimate unavailable");
        }
    }

    board.resolve(request.batch, request.class, outcome.ok());
    commands.entity(request_entity).despawn();
}
