//! SearchResolved system: apply a search response, unless superseded.
//!
//! Last-write-wins keyed by query: a response whose query no longer matches
//! the field's current text is discarded. Geocoder failure degrades to an
//! empty suggestion list rather than an error.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject};
use crate::search::{SearchField, SearchState};
use crate::telemetry::EngineTelemetry;

pub fn search_resolved_system(
    event: Res<CurrentEvent>,
    mut telemetry: ResMut<EngineTelemetry>,
    mut fields: Query<&mut SearchField>,
) {
    if event.0.kind != EventKind::SearchResolved {
        return;
    }
    let Some(EventSubject::Field(field_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut field) = fields.get_mut(field_entity) else {
        return;
    };
    let Some(pending) = field.pending.take() else {
        return;
    };
    if pending.resolve_at != event.0.timestamp {
        // This event belongs to an older request; the current one is still
        // in flight.
        field.pending = Some(pending);
        return;
    }

    if pending.query != field.query {
        telemetry.stale_responses_discarded += 1;
        tracing::debug!(
            superseded = %pending.query,
            current = %field.query,
            "discarding stale search response"
        );
        return;
    }

    field.suggestions = pending.outcome.unwrap_or_default();
    // A keystroke may have re-armed the debounce since; don't clobber it.
    if field.debounce_deadline.is_none() {
        field.state = SearchState::Idle;
    }
}
