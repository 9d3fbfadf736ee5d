//! Location search: debounced free-text queries against the geocoder port.
//!
//! One [`SearchField`] entity per input field. A keystroke restarts the
//! debounce timer; once the query has been quiet for the configured interval
//! (and is long enough) exactly one search is issued. The response is
//! applied only if its query still matches the field's current text —
//! last-write-wins keyed by query, so a superseded in-flight response is
//! discarded, never shown.

use bevy_ecs::prelude::{Component, Resource};

use crate::error::GeocoderError;
use crate::geocode::LocationSuggestion;
use crate::ride::Address;

#[derive(Debug, Clone, Copy, Resource)]
pub struct SearchConfig {
    /// Quiet interval before a query is considered stable.
    pub debounce_ms: u64,
    /// Queries shorter than this clear suggestions instead of searching.
    pub min_query_len: usize,
    /// Simulated round-trip before a forward-search response applies.
    pub response_latency_ms: u64,
    /// Simulated round-trip for a reverse lookup.
    pub reverse_latency_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 3,
            response_latency_ms: 250,
            reverse_latency_ms: 250,
        }
    }
}

/// Controller state for one input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Debouncing,
    Searching,
}

/// A search that has been issued and whose response is still in flight.
#[derive(Debug)]
pub(crate) struct PendingSearch {
    /// Query text the request was issued for; compared against the field's
    /// current query before the response is applied.
    pub query: String,
    pub resolve_at: u64,
    pub outcome: Result<Vec<LocationSuggestion>, GeocoderError>,
}

/// An in-flight reverse lookup from "use current position".
#[derive(Debug)]
pub(crate) struct PendingReverse {
    pub lat: f64,
    pub lng: f64,
    pub resolve_at: u64,
}

/// One text input bound to the geocoder.
#[derive(Debug, Default, Component)]
pub struct SearchField {
    pub query: String,
    pub state: SearchState,
    pub suggestions: Vec<LocationSuggestion>,
    /// Set when a suggestion is accepted or a reverse lookup resolves.
    pub selection: Option<Address>,
    /// Deadline of the armed debounce timer; a fired timer whose timestamp
    /// does not match is stale and ignored.
    pub(crate) debounce_deadline: Option<u64>,
    pub(crate) pending: Option<PendingSearch>,
    pub(crate) pending_reverse: Option<PendingReverse>,
}

impl SearchField {
    pub fn is_loading(&self) -> bool {
        self.state == SearchState::Searching
    }
}
