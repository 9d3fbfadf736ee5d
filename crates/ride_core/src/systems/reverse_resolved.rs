//! ReverseResolved system: resolve a "use current position" lookup.
//!
//! Failure falls back to the formatted coordinate string instead of failing
//! the caller.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::geo::Coordinate;
use crate::geocode::{self, GeocoderResource};
use crate::ride::Address;
use crate::search::{SearchField, SearchState};
use crate::telemetry::EngineTelemetry;

pub fn reverse_resolved_system(
    event: Res<CurrentEvent>,
    geocoder: Res<GeocoderResource>,
    mut telemetry: ResMut<EngineTelemetry>,
    mut fields: Query<&mut SearchField>,
) {
    if event.0.kind != EventKind::ReverseResolved {
        return;
    }
    let Some(EventSubject::Field(field_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut field) = fields.get_mut(field_entity) else {
        return;
    };
    let Some(pending) = field.pending_reverse.take() else {
        return;
    };
    if pending.resolve_at != event.0.timestamp {
        field.pending_reverse = Some(pending);
        return;
    }

    let label = match geocoder.0.reverse(pending.lat, pending.lng) {
        Ok(label) => label,
        Err(err) => {
            telemetry.reverse_fallbacks += 1;
            tracing::warn!(error = %err, "reverse geocode failed, using coordinate fallback");
            geocode::format_coordinate(pending.lat, pending.lng)
        }
    };

    field.query = label.clone();
    field.suggestions.clear();
    if field.debounce_deadline.is_none() {
        field.state = SearchState::Idle;
    }
    field.selection = Some(Address {
        location: Coordinate { lat: pending.lat, lng: pending.lng },
        label,
    });
}
