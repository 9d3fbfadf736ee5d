//! DebounceElapsed system: the query went quiet — issue the search.
//!
//! A restarted timer is detected by comparing the event timestamp with the
//! field's armed deadline. The geocoder is called exactly once per
//! stabilized query; the response applies after the configured latency so a
//! newer keystroke can still supersede it (see `search_resolved`).

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::geocode::GeocoderResource;
use crate::search::{PendingSearch, SearchConfig, SearchField, SearchState};
use crate::telemetry::EngineTelemetry;

pub fn search_debounce_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    config: Res<SearchConfig>,
    geocoder: Res<GeocoderResource>,
    mut telemetry: ResMut<EngineTelemetry>,
    mut fields: Query<&mut SearchField>,
) {
    if event.0.kind != EventKind::DebounceElapsed {
        return;
    }
    let Some(EventSubject::Field(field_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut field) = fields.get_mut(field_entity) else {
        return;
    };
    if field.debounce_deadline != Some(event.0.timestamp) {
        return;
    }
    field.debounce_deadline = None;
    if field.query.chars().count() < config.min_query_len {
        return;
    }

    let outcome = geocoder.0.search(&field.query);
    telemetry.searches_issued += 1;
    if let Err(err) = &outcome {
        telemetry.geocoder_failures += 1;
        tracing::warn!(error = %err, "location search failed, degrading to empty suggestions");
    }

    let resolve_at = clock.now() + config.response_latency_ms;
    let pending = PendingSearch {
        query: field.query.clone(),
        resolve_at,
        outcome,
    };
    if field.pending.replace(pending).is_some() {
        // A previous request was still in flight; its response is superseded.
        telemetry.stale_responses_discarded += 1;
    }
    field.state = SearchState::Searching;
    clock.schedule_at(
        resolve_at,
        EventKind::SearchResolved,
        Some(EventSubject::Field(field_entity)),
    );
}
